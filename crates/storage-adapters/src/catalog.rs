use domains::{Book, CatalogFilter, Category, CategoryId};

/// Groups books, already sorted in catalog order, under their categories.
/// Books rejected by `filter` are dropped, then categories left empty.
pub(crate) fn assemble(
    categories: impl IntoIterator<Item = (CategoryId, String)>,
    books: impl IntoIterator<Item = Book>,
    filter: CatalogFilter,
) -> Vec<Category> {
    let mut pages: Vec<Category> = categories
        .into_iter()
        .map(|(id, name)| Category {
            id,
            name,
            books: Vec::new(),
        })
        .collect();

    for book in books.into_iter().filter(|b| filter.admits(b)) {
        match pages.iter_mut().find(|c| c.id == book.category_id) {
            Some(category) => category.books.push(book),
            None => tracing::warn!(book = %book.id, category = %book.category_id, "book without category"),
        }
    }

    pages.retain(|c| !c.books.is_empty());
    pages
}
