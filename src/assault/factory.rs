pub trait RequestFactory<R> {
    type Error;
    fn produce(&self, target: &http::Uri) -> Result<R, Self::Error>;
}
