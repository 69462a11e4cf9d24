//! Stock items, the item form and its validation

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stock item as served by the shop backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: i32,
    pub title: String,
    pub kind: String,
    pub description: String,
    /// Number of units in stock
    pub quantity: u32,
}

impl StockItem {
    /// Unit price for the item, determined by its kind
    pub fn price(&self) -> i64 {
        match self.kind.as_str() {
            "SmallPrint" => 7,
            "BigPrint" => 20,
            "Button" => 3,
            _ => 0,
        }
    }

    /// File stem the backend stores this item's picture under
    pub fn image_name(&self) -> String {
        image_name(&self.title)
    }
}

pub fn image_name(title: &str) -> String {
    title.trim().replace(' ', "")
}

/// Body of an add or edit request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub title: String,
    pub kind: String,
    pub description: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StockPayload {
    List(Vec<StockItem>),
    Keyed(BTreeMap<String, StockItem>),
}

/// Decode a stock listing. The backend may answer with an array, an
/// id-keyed object or `null`.
pub fn decode_stock(bytes: &[u8]) -> Result<Vec<StockItem>, serde_json::Error> {
    let payload: Option<StockPayload> = serde_json::from_slice(bytes)?;
    Ok(match payload {
        Some(StockPayload::List(items)) => items,
        Some(StockPayload::Keyed(items)) => items.into_values().collect(),
        None => Vec::new(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormField {
    Title,
    Kind,
    Description,
    Quantity,
    Image,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Title,
        FormField::Kind,
        FormField::Description,
        FormField::Quantity,
        FormField::Image,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Kind => "Kind",
            FormField::Description => "Description",
            FormField::Quantity => "Quantity",
            FormField::Image => "Image file",
        }
    }

    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Kind,
            FormField::Kind => FormField::Description,
            FormField::Description => FormField::Quantity,
            FormField::Quantity => FormField::Image,
            FormField::Image => FormField::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Title => FormField::Image,
            FormField::Kind => FormField::Title,
            FormField::Description => FormField::Kind,
            FormField::Quantity => FormField::Description,
            FormField::Image => FormField::Quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{} must not be empty", .0.label())]
    Empty(FormField),
    #[error("quantity must be a whole number of at least 0 (got {0:?})")]
    InvalidQuantity(String),
}

/// Raw text of the item modal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemForm {
    pub title: String,
    pub kind: String,
    pub description: String,
    pub quantity: String,
    pub image: String,
}

impl ItemForm {
    pub fn from_item(item: &StockItem) -> Self {
        Self {
            title: item.title.clone(),
            kind: item.kind.clone(),
            description: item.description.clone(),
            quantity: item.quantity.to_string(),
            image: String::new(),
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Kind => &self.kind,
            FormField::Description => &self.description,
            FormField::Quantity => &self.quantity,
            FormField::Image => &self.image,
        }
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Kind => &mut self.kind,
            FormField::Description => &mut self.description,
            FormField::Quantity => &mut self.quantity,
            FormField::Image => &mut self.image,
        }
    }

    pub fn image_path(&self) -> Option<PathBuf> {
        let trimmed = self.image.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }

    /// Check the form and build a request body from it.
    ///
    /// Text fields are trimmed; blank text counts as empty.
    pub fn validate(&self) -> Result<ItemDraft, ValidationError> {
        let title = required(&self.title, FormField::Title)?;
        let kind = required(&self.kind, FormField::Kind)?;
        let description = required(&self.description, FormField::Description)?;
        let quantity = self
            .quantity
            .trim()
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidQuantity(self.quantity.clone()))?;

        Ok(ItemDraft {
            title,
            kind,
            description,
            quantity,
        })
    }
}

fn required(value: &str, field: FormField) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, kind: &str, description: &str, quantity: &str) -> ItemForm {
        ItemForm {
            title: title.into(),
            kind: kind.into(),
            description: description.into(),
            quantity: quantity.into(),
            image: String::new(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_form() {
        let draft = form(" Cat print ", "SmallPrint", "A cat", "4").validate().unwrap();
        assert_eq!(draft.title, "Cat print");
        assert_eq!(draft.quantity, 4);
    }

    #[test]
    fn test_validate_accepts_zero_quantity() {
        assert!(form("Cat", "Button", "Round", "0").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_text_fields() {
        assert_eq!(
            form("", "Button", "Round", "1").validate(),
            Err(ValidationError::Empty(FormField::Title))
        );
        assert_eq!(
            form("Cat", "  ", "Round", "1").validate(),
            Err(ValidationError::Empty(FormField::Kind))
        );
        assert_eq!(
            form("Cat", "Button", "", "1").validate(),
            Err(ValidationError::Empty(FormField::Description))
        );
    }

    #[test]
    fn test_validate_rejects_bad_quantity() {
        for quantity in ["-1", "", "two", "1.5"] {
            assert!(matches!(
                form("Cat", "Button", "Round", quantity).validate(),
                Err(ValidationError::InvalidQuantity(_))
            ));
        }
    }

    #[test]
    fn test_decode_stock_accepts_array_object_and_null() {
        let array = br#"[{"id":1,"title":"Cat","kind":"Button","description":"d","quantity":3}]"#;
        assert_eq!(decode_stock(array).unwrap().len(), 1);

        let keyed = br#"{"7":{"id":7,"title":"Dog","kind":"BigPrint","description":"d","quantity":0}}"#;
        let items = decode_stock(keyed).unwrap();
        assert_eq!(items[0].id, 7);

        assert!(decode_stock(b"null").unwrap().is_empty());
        assert!(decode_stock(b"{\"oops\":1}").is_err());
    }

    #[test]
    fn test_price_by_kind() {
        let mut item = StockItem {
            id: 1,
            title: "Cat".into(),
            kind: "BigPrint".into(),
            description: String::new(),
            quantity: 1,
        };
        assert_eq!(item.price(), 20);
        item.kind = "Sticker".into();
        assert_eq!(item.price(), 0);
    }

    #[test]
    fn test_image_name_strips_spaces() {
        assert_eq!(image_name("  Big Cat Print "), "BigCatPrint");
    }

    #[test]
    fn test_field_cycle_visits_every_field() {
        let mut field = FormField::Title;
        for _ in 0..FormField::ALL.len() {
            field = field.next();
        }
        assert_eq!(field, FormField::Title);
        assert_eq!(FormField::Title.prev(), FormField::Image);
    }
}
