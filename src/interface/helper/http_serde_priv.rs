use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

macro_rules! http_serde_newtype {
    ($(#[$attr:meta])* $name:ident, $inner:ty, $with:literal) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name(#[serde(with = $with)] pub $inner);
        impl From<$inner> for $name {
            fn from(v: $inner) -> Self {
                Self(v)
            }
        }
        impl Deref for $name {
            type Target = $inner;
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }
        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };
}

http_serde_newtype!(#[derive(Default, Hash)] Method, http::Method, "http_serde::method");
http_serde_newtype!(#[derive(PartialOrd, Ord, Default, Hash)] StatusCode, http::StatusCode, "http_serde::status_code");
http_serde_newtype!(#[derive(Default, Hash)] Uri, http::Uri, "http_serde::uri");
http_serde_newtype!(#[derive(Default)] HeaderMap, http::HeaderMap, "http_serde::header_map");

impl StatusCode {
    pub fn from_u16(code: u16) -> Option<Self> {
        http::StatusCode::from_u16(code).ok().map(Self)
    }
}
