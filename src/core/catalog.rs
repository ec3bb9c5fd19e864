use hashbrown::HashMap;

use crate::{product::Product, types::ProductId};

/// Local cache of the server's product collection, in server order.
///
/// Never the source of truth: it is replaced wholesale by each refresh and
/// only ever shrinks locally through [`ProductCatalog::remove`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductCatalog {
    order: Vec<Product>,
    pos: HashMap<ProductId, usize>,
}

impl ProductCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding `products`, see [`ProductCatalog::replace_all`].
    pub fn from_products(products: Vec<Product>) -> Self {
        let mut catalog = Self::new();
        catalog.replace_all(products);
        catalog
    }

    /// Replaces the whole collection. A repeated id keeps its first position.
    pub fn replace_all(&mut self, products: Vec<Product>) {
        self.order.clear();
        self.pos.clear();
        for product in products {
            if self.pos.contains_key(&product.id) {
                tracing::warn!(id = %product.id, "duplicate product id in server response");
                continue;
            }
            self.pos.insert(product.id.clone(), self.order.len());
            self.order.push(product);
        }
    }

    /// Removes the product with `id`, keeping the relative order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<Product> {
        let idx = self.pos.remove(id)?;
        let removed = self.order.remove(idx);
        for product in &self.order[idx..] {
            if let Some(p) = self.pos.get_mut(&product.id) {
                *p -= 1;
            }
        }
        Some(removed)
    }

    /// Product with `id`, if cached.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.pos.get(id).and_then(|idx| self.order.get(*idx))
    }

    /// True when `id` is cached.
    pub fn contains(&self, id: &str) -> bool {
        self.pos.contains_key(id)
    }

    /// All products in server order.
    pub fn products(&self) -> &[Product] {
        &self.order
    }

    /// Ids in server order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|p| p.id.as_str())
    }

    /// Number of cached products.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
