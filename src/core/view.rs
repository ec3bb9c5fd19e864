use thiserror::Error;

use crate::{
    core::catalog::ProductCatalog,
    product::{EditBuffer, HistoryLogEntry, Product, ProductFields},
    types::{ProductField, ProductId},
};

/// Rejected local transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// An edit operation ran with no row in edit mode.
    #[error("no product is being edited")]
    NotEditing,
    /// Stock input did not parse as a non-negative integer.
    #[error("stock must be a non-negative whole number, got {0:?}")]
    InvalidStock(String),
    /// A required draft field is blank.
    #[error("required field `{0}` is empty")]
    MissingField(ProductField),
    /// The product is not in the local collection.
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),
}

/// Everything the inventory screen shows, owned by exactly one writer.
///
/// Every method is a synchronous transition; network effects live in the
/// runtime and feed their results back through these methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    catalog: ProductCatalog,
    search: String,
    selected: Option<Product>,
    history: Vec<HistoryLogEntry>,
    sidebar_open: bool,
    editing: Option<EditBuffer>,
    add_form_open: bool,
    draft: ProductFields,
}

impl ViewState {
    /// Empty state: no products, no search, nothing open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty state seeded with an initial product collection.
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            catalog: ProductCatalog::from_products(products),
            ..Self::default()
        }
    }

    // --- products ---

    /// Local product cache.
    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    /// Products in server order.
    pub fn products(&self) -> &[Product] {
        self.catalog.products()
    }

    /// Replaces the collection with a fetch result.
    pub fn replace_products(&mut self, products: Vec<Product>) {
        self.catalog.replace_all(products);
    }

    /// Drops a product after the server confirmed its deletion.
    pub fn remove_product(&mut self, id: &str) -> Option<Product> {
        self.catalog.remove(id)
    }

    // --- search ---

    /// Current search text.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Stores new search text; the caller schedules the fetch.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Query to send on the next refresh; `None` means list everything.
    pub fn search_query(&self) -> Option<&str> {
        if self.search.is_empty() {
            None
        } else {
            Some(&self.search)
        }
    }

    // --- edit buffer ---

    /// The edit in progress, if any.
    pub fn editing(&self) -> Option<&EditBuffer> {
        self.editing.as_ref()
    }

    /// Id of the product in edit mode.
    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_ref().map(|e| e.id.as_str())
    }

    /// True when `id` is the row in edit mode.
    pub fn is_editing(&self, id: &str) -> bool {
        self.editing_id() == Some(id)
    }

    /// Starts editing `product`, discarding any other edit in progress.
    ///
    /// The product must be in the local collection; otherwise the current
    /// edit, if any, is left alone.
    pub fn begin_edit(&mut self, product: &Product) -> Result<(), ViewError> {
        if !self.catalog.contains(&product.id) {
            return Err(ViewError::UnknownProduct(product.id.clone()));
        }
        self.editing = Some(EditBuffer::seeded_from(product));
        Ok(())
    }

    /// Merges one field into the edit buffer.
    pub fn update_edit_field(&mut self, field: ProductField, value: &str) -> Result<(), ViewError> {
        let buffer = self.editing.as_mut().ok_or(ViewError::NotEditing)?;
        buffer.fields.set_field(field, value)
    }

    /// Buffer to submit; state is untouched until the server answers.
    pub fn pending_edit(&self) -> Result<EditBuffer, ViewError> {
        self.editing.clone().ok_or(ViewError::NotEditing)
    }

    /// Clears the edit buffer if it still belongs to `id`.
    ///
    /// Returns false when the user has since moved on to another row, in
    /// which case that newer edit is left alone.
    pub fn finish_edit(&mut self, id: &str) -> bool {
        if self.is_editing(id) {
            self.editing = None;
            true
        } else {
            false
        }
    }

    /// Drops the edit buffer, returning it if there was one.
    pub fn cancel_edit(&mut self) -> Option<EditBuffer> {
        self.editing.take()
    }

    // --- add form ---

    /// Whether the add form is shown.
    pub fn add_form_open(&self) -> bool {
        self.add_form_open
    }

    /// Shows or hides the add form.
    pub fn set_add_form_open(&mut self, open: bool) {
        self.add_form_open = open;
    }

    /// Flips the add form and returns its new visibility.
    pub fn toggle_add_form(&mut self) -> bool {
        self.add_form_open = !self.add_form_open;
        self.add_form_open
    }

    /// New-product draft.
    pub fn draft(&self) -> &ProductFields {
        &self.draft
    }

    /// Merges one field into the draft.
    pub fn update_draft_field(&mut self, field: ProductField, value: &str) -> Result<(), ViewError> {
        self.draft.set_field(field, value)
    }

    /// Draft ready for submission, or the first blank required field.
    pub fn submittable_draft(&self) -> Result<ProductFields, ViewError> {
        validate_draft(&self.draft)?;
        Ok(self.draft.clone())
    }

    /// Applies a successful create: close the form and reset the draft.
    pub fn finish_create(&mut self) {
        self.add_form_open = false;
        self.draft = ProductFields::default();
    }

    // --- history sidebar ---

    /// Product whose history was last requested.
    pub fn selected(&self) -> Option<&Product> {
        self.selected.as_ref()
    }

    /// Last fetched history log.
    pub fn history(&self) -> &[HistoryLogEntry] {
        &self.history
    }

    /// Whether the history sidebar is shown.
    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    /// Records the product whose history is being fetched.
    pub fn select_product(&mut self, product: Product) {
        self.selected = Some(product);
    }

    /// Installs a freshly fetched log for the selected product and opens the sidebar.
    pub fn open_history(&mut self, entries: Vec<HistoryLogEntry>) {
        self.history = entries;
        self.sidebar_open = true;
    }

    /// Hides the sidebar; selection and log stay for a later reopen.
    pub fn close_history(&mut self) {
        self.sidebar_open = false;
    }
}

/// Rejects a draft whose required text fields are blank.
pub fn validate_draft(draft: &ProductFields) -> Result<(), ViewError> {
    match draft.missing_fields().first() {
        Some(field) => Err(ViewError::MissingField(*field)),
        None => Ok(()),
    }
}
