//! GraphQL documents sent to the remote platform.

/// Field selection shared by every read of a catalog entity.
macro_rules! entity_fields {
    () => {
        r#"
    id
    handle
    title
    descriptionHtml
    vendor
    productType
    status
    tags
    images(first: 10) {
      edges { node { id url altText width height } }
    }
    variants(first: 1) {
      edges {
        node {
          id
          title
          availableForSale
          price
          compareAtPrice
          sku
          inventoryQuantity
          inventoryPolicy
          inventoryItem { tracked }
        }
      }
    }
    metafields(first: 20) {
      edges { node { namespace key value } }
    }
"#
    };
}

pub const PRODUCT_CREATE: &str = concat!(
    "mutation productCreate($input: ProductInput!) {\n",
    "  productCreate(input: $input) {\n",
    "    product {",
    entity_fields!(),
    "    }\n",
    "    userErrors { field message }\n",
    "  }\n",
    "}\n"
);

pub const PRODUCT_UPDATE: &str = concat!(
    "mutation productUpdate($input: ProductInput!) {\n",
    "  productUpdate(input: $input) {\n",
    "    product {",
    entity_fields!(),
    "    }\n",
    "    userErrors { field message }\n",
    "  }\n",
    "}\n"
);

pub const PRODUCT_DELETE: &str = r#"
mutation productDelete($input: ProductDeleteInput!) {
  productDelete(input: $input) {
    deletedProductId
    userErrors { field message }
  }
}
"#;

pub const PRODUCT_BY_ID: &str = concat!(
    "query getProduct($id: ID!) {\n",
    "  product(id: $id) {",
    entity_fields!(),
    "  }\n",
    "}\n"
);

pub const PRODUCT_BY_HANDLE: &str = concat!(
    "query getProductByHandle($handle: String!) {\n",
    "  productByHandle(handle: $handle) {",
    entity_fields!(),
    "  }\n",
    "}\n"
);

pub const PRODUCTS_PAGE: &str = concat!(
    "query getProducts($query: String!, $first: Int!, $after: String) {\n",
    "  products(first: $first, after: $after, query: $query) {\n",
    "    edges {\n",
    "      cursor\n",
    "      node {",
    entity_fields!(),
    "      }\n",
    "    }\n",
    "    pageInfo { hasNextPage endCursor }\n",
    "  }\n",
    "}\n"
);

pub const METAFIELDS_SET: &str = r#"
mutation metafieldsSet($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    metafields { id namespace key value }
    userErrors { field message code }
  }
}
"#;

pub const VARIANTS_BULK_UPDATE: &str = r#"
mutation productVariantsBulkUpdate($productId: ID!, $variants: [ProductVariantsBulkInput!]!) {
  productVariantsBulkUpdate(productId: $productId, variants: $variants) {
    productVariants { id }
    userErrors { field message }
  }
}
"#;

pub const INVENTORY_ITEM: &str = r#"
query getInventoryItem($variantId: ID!) {
  productVariant(id: $variantId) {
    id
    inventoryItem { id }
  }
}
"#;

pub const INVENTORY_SET_ON_HAND: &str = r#"
mutation inventorySetOnHandQuantities($input: InventorySetOnHandQuantitiesInput!) {
  inventorySetOnHandQuantities(input: $input) {
    inventoryAdjustmentGroup { id }
    userErrors { field message }
  }
}
"#;

pub const PUBLICATIONS: &str = r#"
query getPublications {
  publications(first: 20) {
    edges { node { id name } }
  }
}
"#;

pub const PUBLISHABLE_PUBLISH: &str = r#"
mutation publishablePublish($id: ID!, $input: [PublicationInput!]!) {
  publishablePublish(id: $id, input: $input) {
    userErrors { field message }
  }
}
"#;

pub const ACTIVE_LOCATION: &str = r#"
query getPrimaryLocation {
  locations(first: 1, query: "is_active:true") {
    edges { node { id name } }
  }
}
"#;

/// Reason recorded on inventory corrections.
pub const INVENTORY_REASON: &str = "correction";
