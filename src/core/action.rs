//! Item actions and the REST routes they map to

use reqwest::Method;
use serde::Serialize;
use thiserror::Error;

use crate::domain::ItemDraft;

/// Collection endpoint for stock items
pub const STOCK_PATH: &str = "/api/stock";

/// CRUD operation requested for a stock item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Add,
    Edit,
    Delete,
}

impl ItemAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemAction::Add => "add",
            ItemAction::Edit => "edit",
            ItemAction::Delete => "delete",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            ItemAction::Add => "Added",
            ItemAction::Edit => "Updated",
            ItemAction::Delete => "Deleted",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            ItemAction::Add | ItemAction::Edit => Method::PUT,
            ItemAction::Delete => Method::DELETE,
        }
    }

    /// Resolve the request target. Edit is item-scoped and needs an id; add
    /// and delete target the collection and must not carry one.
    pub fn route(self, id: Option<i32>) -> Result<Route, RouteError> {
        let path = match (self, id) {
            (ItemAction::Add, None) | (ItemAction::Delete, None) => STOCK_PATH.to_string(),
            (ItemAction::Edit, Some(id)) => format!("{STOCK_PATH}/{id}"),
            (action, id) => return Err(RouteError { action, id }),
        };
        Ok(Route {
            method: self.method(),
            path,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no route for {} with id {:?}", .action.as_str(), .id)]
pub struct RouteError {
    pub action: ItemAction,
    pub id: Option<i32>,
}

/// JSON body of an item mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ItemBody {
    Item(ItemDraft),
    Ids(Vec<i32>),
}

/// A routed item mutation, ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRequest {
    pub action: ItemAction,
    pub route: Route,
    pub body: ItemBody,
}

impl ItemRequest {
    pub fn new(action: ItemAction, id: Option<i32>, body: ItemBody) -> Result<Self, RouteError> {
        let route = action.route(id)?;
        Ok(Self {
            action,
            route,
            body,
        })
    }
}
