use morphomatic::expander::paginate;

#[test]
fn test_paginate_empty_input() {
    let ids: Vec<String> = Vec::new();
    let pages = paginate(&ids, 100);

    // Zero items means zero pages
    assert!(pages.is_empty());
}

#[test]
fn test_paginate_page_sizes_and_order() {
    let ids: Vec<u32> = (0..250).collect();
    let pages = paginate(&ids, 100);

    // ceil(250/100) = 3 pages
    assert_eq!(pages.len(), 3);

    // All pages except the last have exactly page_size elements
    assert_eq!(pages[0].len(), 100);
    assert_eq!(pages[1].len(), 100);
    assert_eq!(pages[2].len(), 50);

    // Concatenating the pages reproduces the original sequence in order
    let rebuilt: Vec<u32> = pages.iter().flat_map(|p| p.iter().copied()).collect();
    assert_eq!(rebuilt, ids);
}

#[test]
fn test_paginate_exact_multiple_has_no_trailing_empty_page() {
    let ids: Vec<u32> = (0..200).collect();
    let pages = paginate(&ids, 100);

    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|p| p.len() == 100));
}

#[test]
fn test_paginate_single_short_page() {
    let ids = vec!["a", "b", "c"];
    let pages = paginate(&ids, 100);

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0], &["a", "b", "c"]);
}

#[test]
#[should_panic]
fn test_paginate_rejects_zero_page_size() {
    let ids = vec![1, 2, 3];
    let _ = paginate(&ids, 0);
}
