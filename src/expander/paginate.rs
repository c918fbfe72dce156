/// Splits `items` into pages of at most `page_size` elements, preserving
/// order. An empty input yields zero pages and an exact multiple of
/// `page_size` yields no trailing empty page.
///
/// # Panics
///
/// Panics if `page_size` is zero.
pub fn paginate<T>(items: &[T], page_size: usize) -> Vec<&[T]> {
    assert!(page_size > 0, "page_size must be positive");
    items.chunks(page_size).collect()
}
