use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::{parse_command, Command, ItemAction, ItemBody, ItemRequest};
use crate::domain::{FormField, ItemDraft, ItemForm, Order, OrderFilter, StockItem};
use crate::infrastructure::http::image_preview_path;
use crate::infrastructure::RuntimeCommand;

/// Text of the alert raised for values the dashboard has no handling for
pub const UNEXPECTED_ERROR: &str = "Something has gone wrong unexpectedly";

/// Main tabs in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Stock,
    Orders,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Stock, Tab::Orders];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Stock => "Stock",
            Tab::Orders => "Orders",
        }
    }

    pub fn shortcut(&self) -> char {
        match self {
            Tab::Stock => '1',
            Tab::Orders => '2',
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Stock => Tab::Orders,
            Tab::Orders => Tab::Stock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tab {0:?}")]
pub struct UnknownTab(pub String);

impl FromStr for Tab {
    type Err = UnknownTab;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Tab::ALL
            .into_iter()
            .find(|tab| tab.title().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownTab(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
    Modal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Pending,
    Authenticated,
    Rejected,
}

impl Session {
    pub fn label(&self) -> &'static str {
        match self {
            Session::Anonymous => "anonymous",
            Session::Pending => "logging in",
            Session::Authenticated => "admin",
            Session::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    level: StatusLevel,
    since: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct CommandBar {
    pub input: String,
}

/// Blocking message; all other input waits until it is dismissed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub raised_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalMode {
    Add,
    Edit(i32),
}

#[derive(Debug, Clone)]
pub struct ItemModal {
    pub mode: ModalMode,
    pub form: ItemForm,
    pub focus: FormField,
    /// Where the backend serves the current picture (edit only)
    pub image_url: Option<String>,
}

/// One rendered line of the stock table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRow {
    pub id: i32,
    pub title: String,
    pub kind: String,
    pub description: String,
    pub quantity: u32,
    pub price: i64,
}

impl From<&StockItem> for StockRow {
    fn from(item: &StockItem) -> Self {
        Self {
            id: item.id,
            title: item.title.to_uppercase(),
            kind: item.kind.clone(),
            description: item.description.clone(),
            quantity: item.quantity,
            price: item.price(),
        }
    }
}

/// One rendered line of the orders table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub id: i32,
    pub name: String,
    pub street: String,
    pub zipcode: String,
    pub fulfilled: &'static str,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            name: order.name.clone(),
            street: order.street.clone(),
            zipcode: order.zipcode.clone(),
            fulfilled: if order.fulfilled { "yes" } else { "no" },
        }
    }
}

/// Dashboard state. Network work is never done here: every request is
/// queued in the outbox and answered later through the `apply_*` handlers.
pub struct App {
    current_tab: Option<Tab>,
    stock: BTreeMap<i32, StockItem>,
    stock_rows: Vec<StockRow>,
    order_rows: Vec<OrderRow>,
    order_filter: OrderFilter,
    marked: BTreeSet<i32>,
    pub selected_stock: usize,
    pub selected_order: usize,
    modal: Option<ItemModal>,
    alerts: VecDeque<Alert>,
    pub input_mode: InputMode,
    pub command: CommandBar,
    status: Option<StatusMessage>,
    pub session: Session,
    pub backend_url: String,
    pub help_open: bool,
    pub should_quit: bool,
    outbox: Vec<RuntimeCommand>,
}

impl App {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            current_tab: None,
            stock: BTreeMap::new(),
            stock_rows: Vec::new(),
            order_rows: Vec::new(),
            order_filter: OrderFilter::All,
            marked: BTreeSet::new(),
            selected_stock: 0,
            selected_order: 0,
            modal: None,
            alerts: VecDeque::new(),
            input_mode: InputMode::Normal,
            command: CommandBar::default(),
            status: None,
            session: Session::Anonymous,
            backend_url: backend_url.into(),
            help_open: false,
            should_quit: false,
            outbox: Vec::new(),
        }
    }

    pub fn active_tab(&self) -> Option<Tab> {
        self.current_tab
    }

    pub fn cached_stock(&self) -> &BTreeMap<i32, StockItem> {
        &self.stock
    }

    pub fn stock_rows(&self) -> &[StockRow] {
        &self.stock_rows
    }

    pub fn order_rows(&self) -> &[OrderRow] {
        &self.order_rows
    }

    pub fn order_filter(&self) -> OrderFilter {
        self.order_filter
    }

    pub fn modal(&self) -> Option<&ItemModal> {
        self.modal.as_ref()
    }

    pub fn is_marked(&self, id: i32) -> bool {
        self.marked.contains(&id)
    }

    pub fn marked_count(&self) -> usize {
        self.marked.len()
    }

    fn request(&mut self, cmd: RuntimeCommand) {
        debug!(?cmd, "queued request");
        self.outbox.push(cmd);
    }

    /// Drain queued requests for the runtime
    pub fn take_requests(&mut self) -> Vec<RuntimeCommand> {
        std::mem::take(&mut self.outbox)
    }

    pub fn request_login(&mut self, password: String) {
        self.session = Session::Pending;
        self.request(RuntimeCommand::Login { password });
    }

    /// Show `tab` and start its initial load. Does nothing when `tab` is
    /// already showing.
    pub fn activate(&mut self, tab: Tab) {
        if self.current_tab == Some(tab) {
            return;
        }
        debug!(tab = tab.title(), "activating tab");
        self.current_tab = Some(tab);

        match tab {
            Tab::Stock => self.show_stock(),
            Tab::Orders => self.load_orders(OrderFilter::All.as_str()),
        }
    }

    /// Activate a tab given by name, e.g. from the command line
    pub fn activate_named(&mut self, name: &str) {
        match name.parse::<Tab>() {
            Ok(tab) => self.activate(tab),
            Err(err) => self.app_error(err),
        }
    }

    pub fn cycle_tab(&mut self) {
        let next = self.current_tab.map(Tab::next).unwrap_or(Tab::Stock);
        self.activate(next);
    }

    fn show_stock(&mut self) {
        if !self.ensure_stock_loaded() {
            self.render_stock();
        }
    }

    /// Queue a stock fetch when the cache is empty. Returns whether a fetch
    /// was queued.
    pub fn ensure_stock_loaded(&mut self) -> bool {
        if !self.stock.is_empty() {
            return false;
        }
        self.request(RuntimeCommand::LoadStock);
        true
    }

    /// Rebuild the stock table from the cache
    pub fn render_stock(&mut self) {
        self.stock_rows = self.stock.values().map(StockRow::from).collect();
        clamp_selection(&mut self.selected_stock, self.stock_rows.len());
    }

    /// Drop the cache along with everything rendered from it
    fn invalidate_stock(&mut self) {
        self.stock.clear();
        self.marked.clear();
        self.render_stock();
    }

    pub fn reload_stock(&mut self) {
        self.invalidate_stock();
        self.ensure_stock_loaded();
    }

    /// Replace the cache with a complete listing
    pub fn apply_stock_loaded(&mut self, items: Vec<StockItem>) {
        self.stock = items.into_iter().map(|item| (item.id, item)).collect();
        self.marked.retain(|id| self.stock.contains_key(id));
        self.render_stock();
    }

    pub fn selected_stock_id(&self) -> Option<i32> {
        self.stock_rows.get(self.selected_stock).map(|row| row.id)
    }

    pub fn toggle_mark_selected(&mut self) {
        let Some(id) = self.selected_stock_id() else {
            return;
        };
        if !self.marked.remove(&id) {
            self.marked.insert(id);
        }
    }

    /// Fetch orders for a filter given by name. Nothing is cached; every call
    /// goes to the backend.
    pub fn load_orders(&mut self, filter: &str) {
        match filter.trim().parse::<OrderFilter>() {
            Ok(filter) => {
                self.order_filter = filter;
                self.request(RuntimeCommand::LoadOrders { filter });
            }
            Err(err) => self.app_error(err),
        }
    }

    pub fn cycle_order_filter(&mut self) {
        let next = self.order_filter.next();
        self.load_orders(next.as_str());
    }

    pub fn apply_orders_loaded(&mut self, filter: OrderFilter, orders: Vec<Order>) {
        debug!(%filter, count = orders.len(), "rendering orders");
        self.order_rows = orders.iter().map(OrderRow::from).collect();
        clamp_selection(&mut self.selected_order, self.order_rows.len());
    }

    pub fn open_add_modal(&mut self) {
        self.modal = Some(ItemModal {
            mode: ModalMode::Add,
            form: ItemForm::default(),
            focus: FormField::Title,
            image_url: None,
        });
        self.input_mode = InputMode::Modal;
    }

    pub fn open_edit_modal(&mut self, id: i32) {
        let Some(item) = self.stock.get(&id) else {
            self.app_error(format!("item {id} is not in the stock cache"));
            return;
        };
        self.modal = Some(ItemModal {
            mode: ModalMode::Edit(id),
            form: ItemForm::from_item(item),
            focus: FormField::Title,
            image_url: Some(format!("{}{}", self.backend_url, image_preview_path(item))),
        });
        self.input_mode = InputMode::Modal;
    }

    pub fn open_edit_selected(&mut self) {
        match self.selected_stock_id() {
            Some(id) => self.open_edit_modal(id),
            None => self.set_status("No item selected", StatusLevel::Warn),
        }
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        if self.input_mode == InputMode::Modal {
            self.input_mode = InputMode::Normal;
        }
    }

    pub fn modal_input(&mut self, ch: char) {
        if let Some(modal) = self.modal.as_mut() {
            modal.form.field_mut(modal.focus).push(ch);
        }
    }

    pub fn modal_backspace(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            modal.form.field_mut(modal.focus).pop();
        }
    }

    pub fn modal_focus_next(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            modal.focus = modal.focus.next();
        }
    }

    pub fn modal_focus_prev(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            modal.focus = modal.focus.prev();
        }
    }

    pub fn submit_modal(&mut self) {
        let Some(mode) = self.modal.as_ref().map(|modal| modal.mode) else {
            return;
        };
        match mode {
            ModalMode::Add => self.submit_add(),
            ModalMode::Edit(id) => self.submit_edit(id),
        }
    }

    fn validated_form(&mut self) -> Option<(ItemDraft, ItemForm)> {
        let form = self.modal.as_ref()?.form.clone();
        match form.validate() {
            Ok(draft) => Some((draft, form)),
            Err(err) => {
                self.alert("Check your input", err.to_string());
                None
            }
        }
    }

    fn routed(&mut self, action: ItemAction, id: Option<i32>, body: ItemBody) -> Option<ItemRequest> {
        match ItemRequest::new(action, id, body) {
            Ok(request) => Some(request),
            Err(err) => {
                self.app_error(err);
                None
            }
        }
    }

    /// Create a new item from the modal. A picture is mandatory.
    pub fn submit_add(&mut self) {
        let Some((draft, form)) = self.validated_form() else {
            return;
        };
        let Some(image) = form.image_path() else {
            self.alert("Image required", "Select an image file before adding an item");
            return;
        };
        let title = draft.title.clone();
        let Some(request) = self.routed(ItemAction::Add, None, ItemBody::Item(draft)) else {
            return;
        };

        self.request(RuntimeCommand::UploadImage { title, path: image });
        self.request(RuntimeCommand::SubmitItem(request));
        self.set_status("Adding item…", StatusLevel::Info);
    }

    /// Update item `id` from the modal, replacing its picture when one is set
    pub fn submit_edit(&mut self, id: i32) {
        let Some((draft, form)) = self.validated_form() else {
            return;
        };
        let title = draft.title.clone();
        let Some(request) = self.routed(ItemAction::Edit, Some(id), ItemBody::Item(draft)) else {
            return;
        };

        self.request(RuntimeCommand::SubmitItem(request));
        if let Some(path) = form.image_path() {
            self.request(RuntimeCommand::UploadImage { title, path });
        }
        self.set_status("Saving item…", StatusLevel::Info);
    }

    /// Delete every marked row in one request. Sends nothing when no row is
    /// marked.
    pub fn submit_delete(&mut self) {
        if self.marked.is_empty() {
            self.set_status("No items selected", StatusLevel::Warn);
            return;
        }
        let ids: Vec<i32> = self.marked.iter().copied().collect();
        let count = ids.len();
        let Some(request) = self.routed(ItemAction::Delete, None, ItemBody::Ids(ids)) else {
            return;
        };
        self.request(RuntimeCommand::SubmitItem(request));
        self.set_status(format!("Deleting {count} item(s)…"), StatusLevel::Info);
    }

    /// A mutation went through: close the modal and reload the whole cache
    pub fn apply_item_submitted(&mut self, action: ItemAction) {
        info!(action = action.as_str(), "item mutation confirmed");
        self.close_modal();
        self.set_status(format!("{} item(s)", action.past_tense()), StatusLevel::Info);
        self.reload_stock();
    }

    pub fn apply_logged_in(&mut self) {
        self.session = Session::Authenticated;
        self.set_status("Admin session opened", StatusLevel::Info);
    }

    pub fn apply_login_rejected(&mut self, message: String) {
        self.session = Session::Rejected;
        self.alert("Login failed", message);
    }

    pub fn apply_image_uploaded(&mut self, title: String) {
        self.set_status(format!("Image stored for {title}"), StatusLevel::Info);
    }

    pub fn apply_image_failed(&mut self, title: String, message: String) {
        warn!(%title, "image upload failed: {message}");
        self.alert("Image upload failed", format!("{title}: {message}"));
    }

    pub fn apply_error(&mut self, message: String) {
        self.alert("Error", message);
    }

    pub fn alert(&mut self, title: impl Into<String>, message: impl Into<String>) {
        let alert = Alert {
            title: title.into(),
            message: message.into(),
            raised_at: Local::now(),
        };
        warn!(title = %alert.title, "alert: {}", alert.message);
        self.alerts.push_back(alert);
    }

    /// Generic alert for values with no defined handling
    fn app_error(&mut self, detail: impl fmt::Display) {
        self.alert("Error", format!("{UNEXPECTED_ERROR} ({detail})"));
    }

    pub fn current_alert(&self) -> Option<&Alert> {
        self.alerts.front()
    }

    pub fn dismiss_alert(&mut self) {
        self.alerts.pop_front();
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > Duration::from_secs(3) {
                self.status = None;
            }
        }
    }

    pub fn move_selection_up(&mut self) {
        let selection = self.selection_mut();
        *selection = selection.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        let len = self.list_len();
        let selection = self.selection_mut();
        if *selection + 1 < len {
            *selection += 1;
        }
    }

    pub fn list_len(&self) -> usize {
        match self.current_tab {
            Some(Tab::Stock) => self.stock_rows.len(),
            Some(Tab::Orders) => self.order_rows.len(),
            None => 0,
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.current_tab {
            Some(Tab::Orders) => &mut self.selected_order,
            _ => &mut self.selected_stock,
        }
    }

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    pub fn apply_command(&mut self) {
        let input = std::mem::take(&mut self.command.input);
        self.exit_command();
        if input.trim().is_empty() {
            return;
        }
        self.execute_command(&parse_command(&input));
    }

    pub fn execute_command(&mut self, cmd: &Command) {
        match cmd {
            Command::Tab(name) => self.activate_named(name),
            Command::Orders(filter) => match filter.trim().parse::<OrderFilter>() {
                // Switch without the implicit "All" load; the filter load follows
                Ok(filter) => {
                    self.current_tab = Some(Tab::Orders);
                    self.load_orders(filter.as_str());
                }
                Err(err) => self.app_error(err),
            },
            Command::Reload => match self.current_tab {
                Some(Tab::Stock) => {
                    self.reload_stock();
                    self.set_status("Reloading stock…", StatusLevel::Info);
                }
                Some(Tab::Orders) => {
                    let filter = self.order_filter;
                    self.load_orders(filter.as_str());
                }
                None => {}
            },
            Command::Add => {
                self.activate(Tab::Stock);
                self.open_add_modal();
            }
            Command::Edit => self.open_edit_selected(),
            Command::Delete => self.submit_delete(),
            Command::Help => self.help_open = true,
            Command::Quit => self.should_quit = true,
            Command::Unknown(input) => {
                self.set_status(format!("Unknown command: {input}"), StatusLevel::Warn)
            }
        }
    }
}

fn clamp_selection(selection: &mut usize, len: usize) {
    if len == 0 {
        *selection = 0;
    } else if *selection >= len {
        *selection = len - 1;
    }
}
