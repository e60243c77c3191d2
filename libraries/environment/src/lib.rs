use std::{
    borrow::Borrow,
    env::{self, VarError},
    num::NonZero,
};

use anyhow::{anyhow, Context as _, Result};

pub trait ReadFromVar: Sized {
    fn read_from_var<S>(variable: S) -> Result<Self>
    where
        S: Borrow<str> + Into<String>;

    fn read_from_var_or<S>(variable: S, default: Self) -> Result<Self>
    where
        S: Borrow<str> + Into<String>,
    {
        Self::read_optional_from_var(variable)
            .map(|value| value.unwrap_or(default))
    }

    fn read_optional_from_var<S>(variable: S) -> Result<Option<Self>>
    where
        S: Borrow<str> + Into<String>,
    {
        match env::var(variable.borrow()) {
            Ok(_) => Self::read_from_var(variable).map(Some),
            Err(VarError::NotPresent) => Ok(None),
            Err(error) => Err(error).with_context(|| {
                format!(
                    "Failed to read environment variable {:?}!",
                    variable.borrow(),
                )
            }),
        }
    }
}

impl ReadFromVar for String {
    fn read_from_var<S>(variable: S) -> Result<Self>
    where
        S: Borrow<str> + Into<String>,
    {
        let variable = variable.borrow();

        env::var(variable).with_context(|| {
            format!("Failed to read environment variable {variable:?}!")
        })
    }
}

impl ReadFromVar for bool {
    fn read_from_var<S>(variable: S) -> Result<Self>
    where
        S: Borrow<str> + Into<String>,
    {
        String::read_from_var(variable).and_then(|value| {
            match value.as_str() {
                "1" | "y" | "Y" | "yes" | "true" => Ok(true),
                "0" | "n" | "N" | "no" | "false" => Ok(false),
                _ => Err(anyhow!(
                    "Expected a boolean flag, got {value:?} instead!",
                )),
            }
        })
    }
}

macro_rules! impl_for_parseable {
    ($($type: ty),+ $(,)?) => {
        $(
            impl_for_parseable!(@@@ $type);
            impl_for_parseable!(@@@ NonZero<$type>);
        )+
    };
    (@@@ $type:ty) => {
        impl ReadFromVar for $type
        {
            fn read_from_var<S>(
                variable: S,
            ) -> Result<Self>
            where
                S: Borrow<str> + Into<String>,
            {
                String::read_from_var(variable)
                    .and_then(|value| {
                        value.parse()
                            .context(
                                ::core::concat!(
                                    "Failed to parse \"",
                                    ::core::stringify!($type),
                                    "\"!",
                                ),
                            )
                    })
            }
        }
    };
}

impl_for_parseable![u8, u16, u32, u64, u128];
