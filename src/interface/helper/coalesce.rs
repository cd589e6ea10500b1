// TODO derive
pub trait Coalesce<O = Self> {
    fn coalesce(self, other: &O) -> Self;
}

impl<T: Clone> Coalesce for Option<T> {
    fn coalesce(self, other: &Self) -> Self {
        self.or_else(|| other.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coalesce_option() {
        assert_eq!(Some(1).coalesce(&Some(2)), Some(1));
        assert_eq!(None.coalesce(&Some(2)), Some(2));
        assert_eq!(Some(1).coalesce(&None), Some(1));
        assert_eq!(None::<i32>.coalesce(&None), None);
    }
}
