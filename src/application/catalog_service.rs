use crate::domain::catalog::{Brand, CatalogQuery, Category, Homepage, ProductDetail, ProductPage};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;

pub struct CatalogService<R> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn homepage(&self) -> Result<Homepage, DomainError> {
        self.repo.homepage()
    }

    pub fn list_products(&self, query: &CatalogQuery) -> Result<ProductPage, DomainError> {
        self.repo.list_products(query)
    }

    pub fn product_detail(&self, slug: &str) -> Result<ProductDetail, DomainError> {
        self.repo
            .product_detail(slug)?
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn categories(&self) -> Result<Vec<Category>, DomainError> {
        self.repo.categories()
    }

    pub fn brands(&self) -> Result<Vec<Brand>, DomainError> {
        self.repo.brands()
    }
}
