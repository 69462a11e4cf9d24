//! Screen regions the dashboard draws into
//!
//! Every element the controller renders into has a named binding. The set is
//! checked once at startup so a terminal that cannot fit the layout is
//! reported up front instead of drawing into zero-sized areas.

use ratatui::layout::Rect;
use thiserror::Error;

use crate::domain::FormField;

use super::layout::{areas, modal_areas};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ViewBinding {
    StockTab,
    OrdersTab,
    OrderFilter,
    StockList,
    OrderList,
    ItemModal,
    Title,
    Kind,
    Description,
    Quantity,
    ImageInput,
    Image,
    SubmitItem,
}

impl ViewBinding {
    pub const ALL: [ViewBinding; 13] = [
        ViewBinding::StockTab,
        ViewBinding::OrdersTab,
        ViewBinding::OrderFilter,
        ViewBinding::StockList,
        ViewBinding::OrderList,
        ViewBinding::ItemModal,
        ViewBinding::Title,
        ViewBinding::Kind,
        ViewBinding::Description,
        ViewBinding::Quantity,
        ViewBinding::ImageInput,
        ViewBinding::Image,
        ViewBinding::SubmitItem,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ViewBinding::StockTab => "stockTab",
            ViewBinding::OrdersTab => "ordersTab",
            ViewBinding::OrderFilter => "orderFilter",
            ViewBinding::StockList => "stockList",
            ViewBinding::OrderList => "orderList",
            ViewBinding::ItemModal => "itemModal",
            ViewBinding::Title => "title",
            ViewBinding::Kind => "kind",
            ViewBinding::Description => "description",
            ViewBinding::Quantity => "quantity",
            ViewBinding::ImageInput => "imageInput",
            ViewBinding::Image => "image",
            ViewBinding::SubmitItem => "submitItem",
        }
    }

    /// Input box bound to a form field
    pub fn for_field(field: FormField) -> Self {
        match field {
            FormField::Title => ViewBinding::Title,
            FormField::Kind => ViewBinding::Kind,
            FormField::Description => ViewBinding::Description,
            FormField::Quantity => ViewBinding::Quantity,
            FormField::Image => ViewBinding::ImageInput,
        }
    }

    /// Smallest (width, height) the element can be drawn in
    fn min_size(&self) -> (u16, u16) {
        match self {
            ViewBinding::StockTab | ViewBinding::OrdersTab => (10, 3),
            ViewBinding::OrderFilter => (30, 3),
            ViewBinding::StockList | ViewBinding::OrderList => (40, 5),
            ViewBinding::ItemModal => (40, 19),
            ViewBinding::Title
            | ViewBinding::Kind
            | ViewBinding::Description
            | ViewBinding::Quantity
            | ViewBinding::ImageInput => (20, 3),
            ViewBinding::Image | ViewBinding::SubmitItem => (10, 1),
        }
    }

    pub fn resolve(&self, size: Rect) -> Rect {
        match self {
            ViewBinding::StockTab => areas(size).stock_tab,
            ViewBinding::OrdersTab => areas(size).orders_tab,
            ViewBinding::OrderFilter => areas(size).toolbar,
            ViewBinding::StockList | ViewBinding::OrderList => areas(size).main,
            ViewBinding::ItemModal => modal_areas(size).popup,
            ViewBinding::Title => modal_areas(size).title,
            ViewBinding::Kind => modal_areas(size).kind,
            ViewBinding::Description => modal_areas(size).description,
            ViewBinding::Quantity => modal_areas(size).quantity,
            ViewBinding::ImageInput => modal_areas(size).image_input,
            ViewBinding::Image => modal_areas(size).image,
            ViewBinding::SubmitItem => modal_areas(size).submit,
        }
    }

    fn fits(&self, size: Rect) -> bool {
        let area = self.resolve(size);
        let (width, height) = self.min_size();
        area.width >= width && area.height >= height
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("terminal {width}x{height} is too small for: {}", ids(.missing))]
pub struct ViewError {
    pub width: u16,
    pub height: u16,
    pub missing: Vec<ViewBinding>,
}

fn ids(missing: &[ViewBinding]) -> String {
    missing
        .iter()
        .map(ViewBinding::id)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check that every binding gets a usable region at `size`
pub fn validate(size: Rect) -> Result<(), ViewError> {
    let missing: Vec<ViewBinding> = ViewBinding::ALL
        .into_iter()
        .filter(|binding| !binding.fits(size))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ViewError {
            width: size.width,
            height: size.height,
            missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_terminal_fits_every_binding() {
        assert_eq!(validate(Rect::new(0, 0, 120, 40)), Ok(()));
    }

    #[test]
    fn test_tiny_terminal_lists_missing_bindings() {
        let err = validate(Rect::new(0, 0, 30, 8)).unwrap_err();
        assert!(err.missing.contains(&ViewBinding::ItemModal));
        assert!(err.missing.contains(&ViewBinding::StockList));
        assert!(err.to_string().contains("itemModal"));
        assert!(err.to_string().starts_with("terminal 30x8"));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = ViewBinding::ALL.iter().map(ViewBinding::id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), ViewBinding::ALL.len());
    }

    #[test]
    fn test_every_form_field_has_an_input() {
        for field in FormField::ALL {
            let binding = ViewBinding::for_field(field);
            assert!(!binding.resolve(Rect::new(0, 0, 120, 40)).is_empty());
        }
    }
}
