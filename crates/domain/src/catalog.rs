//! Catalog management: products and categories.

use std::sync::Arc;

use common::{CategoryId, Money, ProductId};
use rust_decimal::Decimal;
use storage::{
    Category, CategoryDraft, Page, Product, ProductDraft, ProductQuery, Store,
};

use crate::{Actor, DomainError};

/// Fields supplied when creating a product.
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub category_id: Option<CategoryId>,
    pub product_name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub discount: Option<Decimal>,
    pub stock: u32,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

/// A partial product update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub category_id: Option<CategoryId>,
    pub product_name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub stock: Option<u32>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// Listing parameters as received from a client.
#[derive(Debug, Clone, Default)]
pub struct ProductListing {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub include_inactive: bool,
}

/// Read and admin-write access to products and categories.
pub struct CatalogService<S: Store> {
    store: Arc<S>,
    default_per_page: u32,
}

impl<S: Store> CatalogService<S> {
    pub fn new(store: Arc<S>, default_per_page: u32) -> Self {
        Self {
            store,
            default_per_page,
        }
    }

    /// Lists products newest first. Inactive products are only listed for
    /// admins who ask for them.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(
        &self,
        actor: Option<&Actor>,
        listing: ProductListing,
    ) -> Result<Page<Product>, DomainError> {
        let is_admin = actor.is_some_and(Actor::is_admin);

        let mut query = ProductQuery::new()
            .page(listing.page.unwrap_or(1))
            .per_page(listing.per_page.unwrap_or(self.default_per_page))
            .include_inactive(is_admin && listing.include_inactive);
        if let Some(term) = listing.search {
            query = query.search(term);
        }
        if let Some(slug) = listing.category.filter(|s| !s.trim().is_empty()) {
            query = query.category(slug.trim());
        }

        Ok(self.store.list_products(&query).await?)
    }

    /// Loads a product. Inactive products look missing to non-admins.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(
        &self,
        actor: Option<&Actor>,
        id: ProductId,
    ) -> Result<Product, DomainError> {
        let is_admin = actor.is_some_and(Actor::is_admin);
        self.store
            .get_product(id)
            .await?
            .filter(|p| is_admin || p.is_active)
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn create_product(
        &self,
        actor: &Actor,
        input: ProductInput,
    ) -> Result<Product, DomainError> {
        actor.require_admin()?;

        let draft = ProductDraft {
            category_id: input.category_id,
            slug: slug_or_derived(input.slug, &input.product_name),
            product_name: input.product_name.trim().to_string(),
            description: input.description,
            price: Money::new(input.price),
            discount: input.discount,
            image_url: input.image_url,
            is_active: input.is_active.unwrap_or(true),
        };
        self.validate_product(&draft).await?;

        let product = self.store.insert_product(draft, input.stock).await?;
        tracing::info!(product_id = %product.id, stock = product.stock, "Product created");
        Ok(product)
    }

    #[tracing::instrument(skip(self, patch))]
    pub async fn update_product(
        &self,
        actor: &Actor,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, DomainError> {
        actor.require_admin()?;

        let current = self
            .store
            .get_product(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))?;

        let product_name = patch
            .product_name
            .map(|n| n.trim().to_string())
            .unwrap_or(current.product_name);
        let draft = ProductDraft {
            category_id: patch.category_id.or(current.category_id),
            slug: patch
                .slug
                .map(|s| slug_or_derived(Some(s), &product_name))
                .unwrap_or(current.slug),
            product_name,
            description: patch.description.or(current.description),
            price: patch.price.map(Money::new).unwrap_or(current.price),
            discount: patch.discount.or(current.discount),
            image_url: patch.image_url.or(current.image_url),
            is_active: patch.is_active.unwrap_or(current.is_active),
        };
        self.validate_product(&draft).await?;

        self.store
            .update_product(id, draft, patch.stock)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    /// Deletes a product. Cart and order lines referring to it are kept.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, actor: &Actor, id: ProductId) -> Result<(), DomainError> {
        actor.require_admin()?;
        if self.store.delete_product(id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found("Product", id))
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.store.list_categories().await?)
    }

    pub async fn get_category(&self, id: CategoryId) -> Result<Category, DomainError> {
        self.store
            .get_category(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn create_category(
        &self,
        actor: &Actor,
        input: CategoryInput,
    ) -> Result<Category, DomainError> {
        actor.require_admin()?;
        let draft = category_draft(input)?;
        Ok(self.store.insert_category(draft).await?)
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        actor: &Actor,
        id: CategoryId,
        input: CategoryInput,
    ) -> Result<Category, DomainError> {
        actor.require_admin()?;
        let draft = category_draft(input)?;
        self.store
            .update_category(id, draft)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    /// Deletes a category; its products stay in the catalog uncategorised.
    #[tracing::instrument(skip(self))]
    pub async fn delete_category(&self, actor: &Actor, id: CategoryId) -> Result<(), DomainError> {
        actor.require_admin()?;
        if self.store.delete_category(id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found("Category", id))
        }
    }

    async fn validate_product(&self, draft: &ProductDraft) -> Result<(), DomainError> {
        if draft.product_name.is_empty() {
            return Err(DomainError::validation("The product name field is required."));
        }
        if draft.slug.is_empty() {
            return Err(DomainError::validation("The slug field is required."));
        }
        if draft.price.is_negative() {
            return Err(DomainError::validation("The price must be at least 0."));
        }
        if !draft.price.is_storable() {
            return Err(DomainError::validation(format!(
                "The price must have at most 2 decimal places and not exceed {}.",
                Money::max_stored()
            )));
        }
        if let Some(discount) = draft.discount
            && (discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED)
        {
            return Err(DomainError::validation(
                "The discount must be between 0 and 100.",
            ));
        }
        if let Some(category_id) = draft.category_id
            && self.store.get_category(category_id).await?.is_none()
        {
            return Err(DomainError::validation("The selected category is invalid."));
        }
        Ok(())
    }
}

fn category_draft(input: CategoryInput) -> Result<CategoryDraft, DomainError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::validation("The name field is required."));
    }
    let slug = slug_or_derived(input.slug, &name);
    if slug.is_empty() {
        return Err(DomainError::validation("The slug field is required."));
    }
    Ok(CategoryDraft {
        name,
        slug,
        description: input.description,
    })
}

fn slug_or_derived(slug: Option<String>, name: &str) -> String {
    match slug {
        Some(s) if !s.trim().is_empty() => slugify(&s),
        _ => slugify(name),
    }
}

/// Lowercases ASCII alphanumerics and joins the runs between them with `-`.
pub fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;
    use storage::InMemoryStore;

    fn service() -> CatalogService<InMemoryStore> {
        CatalogService::new(Arc::new(InMemoryStore::new()), 12)
    }

    fn admin() -> Actor {
        Actor::admin(UserId::new())
    }

    fn input(name: &str) -> ProductInput {
        ProductInput {
            product_name: name.to_string(),
            price: Decimal::new(1250, 2),
            stock: 4,
            ..Default::default()
        }
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Green Tea -- 500g! "), "green-tea-500g");
        assert_eq!(slugify("!!!"), "");
    }

    #[tokio::test]
    async fn create_product_requires_admin() {
        let svc = service();
        let err = svc
            .create_product(&Actor::user(UserId::new()), input("Mug"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn create_product_derives_slug_and_validates() {
        let svc = service();
        let product = svc.create_product(&admin(), input("Blue Mug")).await.unwrap();
        assert_eq!(product.slug, "blue-mug");
        assert!(product.is_active);

        let mut bad = input("Cup");
        bad.discount = Some(Decimal::from(120));
        assert!(matches!(
            svc.create_product(&admin(), bad).await,
            Err(DomainError::Validation(_))
        ));

        let mut orphan = input("Cup");
        orphan.category_id = Some(CategoryId::new());
        assert!(matches!(
            svc.create_product(&admin(), orphan).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn price_must_fit_the_ledger() {
        let svc = service();

        for price in [Decimal::MAX, Decimal::new(1_000_000_000_000, 2), Decimal::new(1999, 3)] {
            let mut pricey = input("Crown");
            pricey.price = price;
            assert!(matches!(
                svc.create_product(&admin(), pricey).await,
                Err(DomainError::Validation(_))
            ));
        }

        let product = svc.create_product(&admin(), input("Tiara")).await.unwrap();
        let err = svc
            .update_product(
                &admin(),
                product.id,
                ProductPatch {
                    price: Some(Decimal::MAX),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn update_product_patches_fields() {
        let svc = service();
        let product = svc.create_product(&admin(), input("Mug")).await.unwrap();

        let updated = svc
            .update_product(
                &admin(),
                product.id,
                ProductPatch {
                    price: Some(Decimal::from(9)),
                    stock: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.product_name, "Mug");
        assert_eq!(updated.price, Money::from_major(9));
        assert_eq!(updated.stock, 10);
    }

    #[tokio::test]
    async fn inactive_products_hidden_from_public() {
        let svc = service();
        let mut hidden = input("Prototype");
        hidden.is_active = Some(false);
        let product = svc.create_product(&admin(), hidden).await.unwrap();

        assert!(matches!(
            svc.get_product(None, product.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(svc.get_product(Some(&admin()), product.id).await.is_ok());

        let listing = ProductListing {
            include_inactive: true,
            ..Default::default()
        };
        let public = svc.list_products(None, listing.clone()).await.unwrap();
        assert_eq!(public.total, 0);
        let all = svc.list_products(Some(&admin()), listing).await.unwrap();
        assert_eq!(all.total, 1);
    }

    #[tokio::test]
    async fn duplicate_category_slug_is_validation_error() {
        let svc = service();
        let category = CategoryInput {
            name: "Kitchen".into(),
            ..Default::default()
        };
        svc.create_category(&admin(), category.clone()).await.unwrap();

        assert!(matches!(
            svc.create_category(&admin(), category).await,
            Err(DomainError::Validation(_))
        ));
    }
}
