use serde::{Deserialize, Serialize};

use crate::{
    assault::factory::RequestFactory,
    interface::helper::{coalesce::Coalesce, http_serde_priv, is_default::IsDefault},
};

/// What every iteration sends. The body is always empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct HttpRequest {
    #[serde(default, skip_serializing_if = "IsDefault::is_default")]
    pub method: Option<http_serde_priv::Method>,
    #[serde(default, skip_serializing_if = "IsDefault::is_default")]
    pub headers: Option<http_serde_priv::HeaderMap>,
}
impl Coalesce for HttpRequest {
    fn coalesce(self, other: &Self) -> Self {
        Self { method: self.method.coalesce(&other.method), headers: self.headers.coalesce(&other.headers) }
    }
}

impl<B: Default> RequestFactory<http::Request<B>> for HttpRequest {
    type Error = http::Error;
    fn produce(&self, target: &http::Uri) -> Result<http::Request<B>, Self::Error> {
        let HttpRequest { method, headers } = self;
        let method = method.as_ref().map(|m| (**m).clone()).unwrap_or_default();

        let mut request = http::Request::builder().uri(target.clone()).method(method).body(B::default())?;
        if let Some(headers) = headers {
            request.headers_mut().extend((**headers).clone());
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn test_default_is_get_without_body() {
        let target: http::Uri = "http://localhost:3000/api/products".parse().unwrap();
        let request: http::Request<Bytes> = HttpRequest::default().produce(&target).unwrap();

        assert_eq!(request.method(), http::Method::GET);
        assert_eq!(request.uri(), &target);
        assert!(request.headers().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_method_and_headers() {
        let mut headers = http::HeaderMap::new();
        headers.insert(http::header::ACCEPT, "application/json".parse().unwrap());
        let factory = HttpRequest { method: Some(http::Method::HEAD.into()), headers: Some(headers.into()) };

        let request: http::Request<Bytes> = factory.produce(&"http://localhost/".parse().unwrap()).unwrap();
        assert_eq!(request.method(), http::Method::HEAD);
        assert_eq!(request.headers()[http::header::ACCEPT], "application/json");
    }

    #[test]
    fn test_coalesce_prefers_self() {
        let cli = HttpRequest { method: Some(http::Method::POST.into()), headers: None };
        let file = HttpRequest { method: Some(http::Method::GET.into()), headers: Some(Default::default()) };
        let HttpRequest { method, headers } = cli.coalesce(&file);
        assert_eq!(*method.unwrap(), http::Method::POST);
        assert!(headers.is_some());
    }
}
