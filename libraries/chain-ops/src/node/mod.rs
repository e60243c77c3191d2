use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use anyhow::{Context as _, Result};
use cosmrs::proto::cosmos::{
    auth::v1beta1::query_client::QueryClient as AuthQueryClient,
    tx::v1beta1::service_client::ServiceClient as TxServiceClient,
};
use tokio::sync::RwLock;
use tonic::{
    transport::{Channel as GrpcChannel, ClientTlsConfig, Endpoint, Uri},
    Code as TonicCode,
};

mod broadcast_tx;
mod query_auth;

#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    pub async fn connect(uri: &str) -> Result<Self> {
        const CONNECT_TO_GRPC_ERROR: &str =
            "Failed to connect to node's gRPC endpoint!";

        let uri: Uri = uri.parse().with_context(|| {
            format!(r#"Failed to parse gRPC URI, "{uri}"!"#)
        })?;

        let endpoint = {
            let endpoint = Endpoint::from(uri.clone())
                .origin(uri.clone())
                .keep_alive_while_idle(true);

            if matches!(uri.scheme_str(), Some("http")) {
                endpoint
            } else {
                endpoint
                    .tls_config(
                        ClientTlsConfig::new()
                            .assume_http2(true)
                            .with_webpki_roots(),
                    )
                    .context(
                        "Failed to configure TLS for node's gRPC endpoint!",
                    )?
            }
        };

        endpoint
            .connect()
            .await
            .map(|grpc| Self {
                inner: Arc::new(ClientInner {
                    should_reconnect: const { AtomicBool::new(false) },
                    uri,
                    endpoint,
                    grpc: RwLock::new(grpc),
                }),
            })
            .context(CONNECT_TO_GRPC_ERROR)
    }
}

macro_rules! define_interface {
    ($($method: ident => $interface: ident),+ $(,)?) => {
        $(
            #[derive(Clone)]
            #[must_use]
            pub struct $interface {
                inner: Arc<ClientInner>,
            }

            impl $interface {
                #[inline]
                const fn new(inner: Arc<ClientInner>) -> Self {
                    Self { inner }
                }
            }

            impl Client {
                #[inline]
                pub fn $method(self) -> $interface {
                    $interface::new(self.inner)
                }
            }
        )+
    };
}

define_interface![
    broadcast_tx => BroadcastTx,
    query_auth => QueryAuth,
];

struct ClientInner {
    should_reconnect: AtomicBool,
    uri: Uri,
    endpoint: Endpoint,
    grpc: RwLock<GrpcChannel>,
}

impl ClientInner {
    fn set_should_reconnect(&self) {
        self.should_reconnect.store(true, Ordering::Release);
    }

    async fn reconnect_if_required(&self) -> Result<()> {
        if self.should_reconnect.load(Ordering::Acquire) {
            self.reconnect().await
        } else {
            Ok(())
        }
    }

    async fn auth_query_client(
        self: &Arc<Self>,
    ) -> Result<AuthQueryClient<GrpcChannel>> {
        self.reconnect_if_required().await?;

        Ok(AuthQueryClient::with_origin(
            self.grpc.read().await.clone(),
            self.uri.clone(),
        ))
    }

    async fn tx_service_client(
        self: &Arc<Self>,
    ) -> Result<TxServiceClient<GrpcChannel>> {
        self.reconnect_if_required().await?;

        Ok(TxServiceClient::with_origin(
            self.grpc.read().await.clone(),
            self.uri.clone(),
        ))
    }
}

impl ClientInner {
    async fn reconnect(&self) -> Result<()> {
        const RECONNECT_ERROR: &str =
            "Failed to reconnect to node's gRPC endpoint!";

        let mut lock = self.grpc.write().await;

        if self.should_reconnect.load(Ordering::Acquire) {
            let new_channel =
                self.endpoint.connect().await.context(RECONNECT_ERROR)?;

            *lock = new_channel;

            self.should_reconnect.store(false, Ordering::Release);
        }

        Ok(())
    }
}

fn set_reconnect_if_required(
    client_inner: &ClientInner,
    error_code: TonicCode,
) {
    if matches!(
        error_code,
        TonicCode::Unavailable | TonicCode::Unknown | TonicCode::Cancelled
    ) {
        client_inner.set_should_reconnect();
    }
}
