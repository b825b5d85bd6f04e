//! In-memory admin panel behind the [`Driver`] trait
//!
//! [`FakeAdminPanel`] plays the application: it owns the product list and
//! outlives browser sessions, so data written by one session is visible to
//! the next. [`FakeBrowser`] plays one browser tab rendering that
//! application. Rendering is a flat list of nodes, each tagged with the exact
//! locators from [`selectors`] that would match it in the real markup; the
//! fake understands the suite's selector vocabulary and nothing else.
//!
//! Knobs for orchestration tests: a render delay after every navigation or
//! tab switch, hidden locators (never match) and disabled locators (match
//! but never clickable).

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::config::Credentials;
use crate::driver::{Driver, ElementHandle, Launcher};
use crate::error::{E2eError, E2eResult};
use crate::locator::{selectors, Locator};
use crate::panel::Tab;
use crate::product::Category;

/// A product as the fake application stores it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
    pub dispatched: bool,
}

impl ProductRecord {
    fn option_label(&self) -> String {
        format!("{} - {}", self.name, self.category)
    }
}

#[derive(Debug, Default)]
struct AppState {
    products: Vec<ProductRecord>,
    next_id: u64,
    hidden: HashSet<Locator>,
    disabled: HashSet<Locator>,
    render_delay: Duration,
    category_select: bool,
    launches: usize,
    closes: usize,
    journal: Vec<String>,
    fail_launch: bool,
}

/// The application under test, shared by every fake browser opened on it
#[derive(Clone)]
pub struct FakeAdminPanel {
    base_url: String,
    credentials: Credentials,
    state: Arc<Mutex<AppState>>,
}

impl FakeAdminPanel {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            state: Arc::new(Mutex::new(AppState {
                next_id: 1,
                ..Default::default()
            })),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn dashboard_url(&self) -> String {
        format!("{}/dashboard", self.base_url)
    }

    /// Insert a product directly, as if an earlier run had created it
    pub fn seed(&self, name: &str, category: Category, price: f64, quantity: i64) -> u64 {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.products.push(ProductRecord {
            id,
            name: name.to_string(),
            category: category.label().to_string(),
            description: format!("{} (seeded)", name),
            price,
            quantity,
            dispatched: false,
        });
        id
    }

    pub fn products(&self) -> Vec<ProductRecord> {
        self.state.lock().products.clone()
    }

    pub fn product_named(&self, name: &str) -> Option<ProductRecord> {
        self.state.lock().products.iter().find(|p| p.name == name).cloned()
    }

    /// Elements matching `locator` are never rendered
    pub fn hide(&self, locator: Locator) {
        self.state.lock().hidden.insert(locator);
    }

    pub fn unhide(&self, locator: &Locator) {
        self.state.lock().hidden.remove(locator);
    }

    /// Elements matching `locator` render but are never enabled
    pub fn disable(&self, locator: Locator) {
        self.state.lock().disabled.insert(locator);
    }

    /// Content appears this long after each navigation or tab switch
    pub fn set_render_delay(&self, delay: Duration) {
        self.state.lock().render_delay = delay;
    }

    /// Render the add form's category as a select instead of a text field
    pub fn use_category_select(&self, select: bool) {
        self.state.lock().category_select = select;
    }

    /// Make the next launches fail as if no browser could be started
    pub fn fail_launches(&self, fail: bool) {
        self.state.lock().fail_launch = fail;
    }

    pub fn launch_count(&self) -> usize {
        self.state.lock().launches
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().closes
    }

    /// Session-level events in order: launch, goto, close
    pub fn journal(&self) -> Vec<String> {
        self.state.lock().journal.clone()
    }

    fn record(&self, event: String) {
        self.state.lock().journal.push(event);
    }

    pub fn launcher(&self) -> FakeLauncher {
        FakeLauncher { app: self.clone() }
    }

    pub fn open_browser(&self) -> FakeBrowser {
        FakeBrowser {
            app: self.clone(),
            view: Mutex::new(View::new(self.base_url.clone())),
        }
    }
}

/// Opens [`FakeBrowser`]s on one [`FakeAdminPanel`]
pub struct FakeLauncher {
    app: FakeAdminPanel,
}

#[async_trait]
impl Launcher for FakeLauncher {
    async fn launch(&self) -> E2eResult<Box<dyn Driver>> {
        {
            let mut state = self.app.state.lock();
            if state.fail_launch {
                return Err(E2eError::SessionStartup("fake browser refused to start".into()));
            }
            state.launches += 1;
            state.journal.push("launch".into());
        }
        Ok(Box::new(self.app.open_browser()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listbox {
    Category,
    Products,
}

#[derive(Debug, Default, Clone)]
struct ProductFields {
    name: String,
    category: String,
    description: String,
    price: String,
    quantity: String,
}

#[derive(Debug, Clone)]
struct Toast {
    title: String,
    key: String,
}

struct View {
    url: String,
    authenticated: bool,
    tab: Tab,
    rendered_at: Instant,
    username: String,
    password: String,
    add_form: ProductFields,
    update_form: ProductFields,
    selected: Option<u64>,
    listbox: Option<Listbox>,
    confirm_delete: Option<u64>,
    toasts: Vec<Toast>,
    closed: bool,
}

impl View {
    fn new(url: String) -> Self {
        Self {
            url,
            authenticated: false,
            tab: Tab::Inventory,
            rendered_at: Instant::now(),
            username: String::new(),
            password: String::new(),
            add_form: ProductFields::default(),
            update_form: ProductFields::default(),
            selected: None,
            listbox: None,
            confirm_delete: None,
            toasts: Vec::new(),
            closed: false,
        }
    }

    /// Component state is lost on every page load
    fn reload(&mut self, url: String) {
        let authenticated = self.authenticated;
        *self = View::new(url);
        self.authenticated = authenticated;
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.rendered_at = Instant::now();
        self.add_form = ProductFields::default();
        self.update_form = ProductFields::default();
        self.selected = None;
        self.listbox = None;
        self.confirm_delete = None;
    }

    /// Clicking a select's trigger opens its listbox, or shuts it if open
    fn toggle_listbox(&mut self, listbox: Listbox) {
        self.listbox = match self.listbox {
            Some(open) if open == listbox => None,
            _ => Some(listbox),
        };
    }

    fn toast(&mut self, title: &str, key: String) {
        self.toasts.push(Toast {
            title: title.to_string(),
            key,
        });
    }
}

#[derive(Debug)]
struct Node {
    id: String,
    text: String,
    matches: Vec<Locator>,
    /// Always present, even during the render delay
    shell: bool,
}

impl Node {
    fn new(id: impl Into<String>, text: impl Into<String>, matches: Vec<Locator>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            matches,
            shell: false,
        }
    }

    fn shell(mut self) -> Self {
        self.shell = true;
        self
    }
}

/// One browser tab on a [`FakeAdminPanel`]
pub struct FakeBrowser {
    app: FakeAdminPanel,
    view: Mutex<View>,
}

impl FakeBrowser {
    fn on_dashboard(&self, view: &View) -> bool {
        view.url.contains("/dashboard")
    }

    fn render(&self, view: &View, state: &AppState) -> Vec<Node> {
        let products = &state.products;
        let category_select = state.category_select;
        let mut nodes = vec![Node::new("root", "", vec![selectors::page_root()]).shell()];

        if !self.on_dashboard(view) {
            nodes.push(Node::new(
                "login:username",
                "",
                vec![selectors::username_input()],
            ));
            nodes.push(Node::new(
                "login:password",
                "",
                vec![selectors::password_input()],
            ));
            nodes.push(Node::new("login:submit", "Login", vec![selectors::submit_button()]));
            self.render_toasts(view, &mut nodes);
            return nodes;
        }

        nodes.push(Node::new("title", "E-Commerce Admin", vec![selectors::dashboard_title()]).shell());
        nodes.push(Node::new("logout", "Logout", vec![selectors::logout_button()]).shell());
        for tab in Tab::ALL {
            nodes.push(
                Node::new(
                    format!("tab:{}", tab.label()),
                    tab.label(),
                    vec![selectors::tab(tab.label())],
                )
                .shell(),
            );
        }
        nodes.push(Node::new(
            "heading",
            view.tab.heading(),
            vec![selectors::heading(view.tab.heading())],
        ));

        match view.tab {
            Tab::Inventory => self.render_inventory(products, &mut nodes),
            Tab::AddProduct => self.render_add(view, category_select, &mut nodes),
            Tab::Update => self.render_update(view, products, &mut nodes),
            Tab::Delete => self.render_delete(view, products, &mut nodes),
            Tab::Dispatch => self.render_dispatch(products, &mut nodes),
        }
        self.render_toasts(view, &mut nodes);
        nodes
    }

    fn render_toasts(&self, view: &View, nodes: &mut Vec<Node>) {
        for (i, toast) in view.toasts.iter().enumerate() {
            nodes.push(
                Node::new(
                    format!("toast:{}", i),
                    format!("{} {}", toast.title, toast.key),
                    vec![selectors::notice(&toast.title), selectors::notice(&toast.key)],
                )
                .shell(),
            );
        }
    }

    fn render_inventory(&self, products: &[ProductRecord], nodes: &mut Vec<Node>) {
        for (i, title) in ["Total Products", "Total Value", "Low Stock", "Dispatched"]
            .iter()
            .enumerate()
        {
            nodes.push(Node::new(format!("card:{}", i), *title, vec![selectors::summary_cards()]));
        }
        nodes.push(Node::new("card:overview", "Inventory Overview", vec![selectors::summary_cards()]));

        if products.is_empty() {
            nodes.push(Node::new(
                "empty",
                "No products in inventory. Add your first product to get started.",
                vec![selectors::empty_state()],
            ));
            return;
        }
        nodes.push(Node::new("table", "", vec![selectors::inventory_table()]));
        for p in products {
            let status = if p.dispatched { "Dispatched" } else { "In Stock" };
            nodes.push(Node::new(
                format!("row:{}", p.id),
                format!(
                    "{} {} ${:.2} {} {} {}",
                    p.name, p.description, p.price, p.quantity, p.category, status
                ),
                vec![selectors::inventory_rows(), selectors::inventory_row_named(&p.name)],
            ));
            nodes.push(Node::new(
                format!("status:{}", p.id),
                status,
                vec![selectors::status_badges()],
            ));
        }
    }

    fn render_add(&self, view: &View, category_select: bool, nodes: &mut Vec<Node>) {
        nodes.push(Node::new(
            "add:name",
            "",
            vec![selectors::name_input(), selectors::username_input()],
        ));
        if category_select {
            nodes.push(Node::new(
                "add:category-select",
                view.add_form.category.clone(),
                vec![selectors::combobox()],
            ));
        } else {
            nodes.push(Node::new("add:category", "", vec![selectors::category_input()]));
        }
        if category_select && view.listbox == Some(Listbox::Category) {
            for (i, category) in Category::ALL.iter().enumerate() {
                nodes.push(Node::new(
                    format!("opt:{}", i),
                    category.label(),
                    vec![
                        selectors::options(),
                        selectors::nth_option(i + 1),
                        selectors::option_containing(category.label()),
                    ],
                ));
            }
        }
        nodes.push(Node::new("add:description", "", vec![selectors::description_input()]));
        nodes.push(Node::new("add:price", "", vec![selectors::price_input()]));
        nodes.push(Node::new("add:quantity", "", vec![selectors::quantity_input()]));
        nodes.push(Node::new(
            "add:submit",
            "Add Product",
            vec![selectors::form_submit("Add Product"), selectors::submit_button()],
        ));
    }

    fn render_update(&self, view: &View, products: &[ProductRecord], nodes: &mut Vec<Node>) {
        let label = view
            .selected
            .and_then(|id| products.iter().find(|p| p.id == id))
            .map(|p| p.option_label())
            .unwrap_or_else(|| "Choose a product".to_string());
        nodes.push(Node::new("upd:select", label, vec![selectors::combobox()]));

        if view.listbox == Some(Listbox::Products) {
            for (i, p) in products.iter().enumerate() {
                nodes.push(Node::new(
                    format!("opt:{}", i),
                    p.option_label(),
                    vec![
                        selectors::options(),
                        selectors::nth_option(i + 1),
                        selectors::option_containing(&p.name),
                    ],
                ));
            }
        }
        if view.selected.is_some() {
            nodes.push(Node::new("upd:name", "", vec![selectors::username_input()]));
            nodes.push(Node::new("upd:description", "", vec![selectors::description_input()]));
            nodes.push(Node::new("upd:price", "", vec![selectors::price_input()]));
            nodes.push(Node::new("upd:quantity", "", vec![selectors::quantity_input()]));
            nodes.push(Node::new(
                "upd:submit",
                "Update Product",
                vec![selectors::form_submit("Update Product"), selectors::submit_button()],
            ));
        }
    }

    fn render_delete(&self, view: &View, products: &[ProductRecord], nodes: &mut Vec<Node>) {
        if products.is_empty() {
            nodes.push(Node::new("empty", "No products in inventory", vec![selectors::empty_state()]));
        }
        for p in products {
            nodes.push(Node::new(
                format!("del:{}", p.id),
                "Delete",
                vec![
                    selectors::row_action("Delete"),
                    selectors::row_action_for("Delete", &p.name),
                ],
            ));
        }
        if view.confirm_delete.is_some() {
            nodes.push(Node::new("dlg:cancel", "Cancel", vec![selectors::dialog_cancel()]));
            nodes.push(Node::new("dlg:confirm", "Delete", vec![selectors::dialog_confirm()]));
        }
    }

    fn render_dispatch(&self, products: &[ProductRecord], nodes: &mut Vec<Node>) {
        let available: Vec<_> = products.iter().filter(|p| p.quantity > 0).collect();
        if available.is_empty() {
            nodes.push(Node::new(
                "empty",
                "No products available for dispatch",
                vec![selectors::empty_state()],
            ));
        }
        for p in available {
            nodes.push(Node::new(
                format!("dsp:{}", p.id),
                "Dispatch",
                vec![
                    selectors::row_action("Dispatch"),
                    selectors::row_action_for("Dispatch", &p.name),
                ],
            ));
        }
    }

    /// Nodes currently visible to `find_all`, honoring delay and hidden knobs
    fn visible_nodes(&self) -> E2eResult<Vec<Node>> {
        let view = self.view.lock();
        if view.closed {
            return Err(E2eError::Driver("session is closed".into()));
        }
        let state = self.app.state.lock();
        let settled = view.rendered_at + state.render_delay <= Instant::now();
        Ok(self
            .render(&view, &state)
            .into_iter()
            .filter(|n| settled || n.shell)
            .filter(|n| !n.matches.iter().any(|m| state.hidden.contains(m)))
            .collect())
    }

    fn node(&self, element: &ElementHandle) -> E2eResult<Node> {
        self.visible_nodes()?
            .into_iter()
            .find(|n| n.id == element.id())
            .ok_or_else(|| E2eError::StaleElement(element.id().to_string()))
    }

    fn field<'v>(view: &'v mut View, id: &str) -> Option<&'v mut String> {
        let field = match id {
            "login:username" => &mut view.username,
            "login:password" => &mut view.password,
            "add:name" => &mut view.add_form.name,
            "add:category" => &mut view.add_form.category,
            "add:description" => &mut view.add_form.description,
            "add:price" => &mut view.add_form.price,
            "add:quantity" => &mut view.add_form.quantity,
            "upd:name" => &mut view.update_form.name,
            "upd:description" => &mut view.update_form.description,
            "upd:price" => &mut view.update_form.price,
            "upd:quantity" => &mut view.update_form.quantity,
            _ => return None,
        };
        Some(field)
    }

    fn goto_locked(&self, view: &mut View, url: &str) {
        let mut target = url.trim_end_matches('/').to_string();
        // The dashboard bounces unauthenticated visitors to the login page
        if target.contains("/dashboard") && !view.authenticated {
            target = self.app.base_url.clone();
        }
        view.reload(target);
    }

    fn submit_login(&self, view: &mut View) {
        if view.username == self.app.credentials.username
            && view.password == self.app.credentials.password
        {
            view.authenticated = true;
            let url = self.app.dashboard_url();
            view.reload(url);
        } else {
            view.toast("Login failed", "Invalid username or password".to_string());
        }
    }

    fn submit_add(&self, view: &mut View) {
        let form = &view.add_form;
        let required = [&form.name, &form.category, &form.description, &form.price, &form.quantity];
        if required.iter().any(|f| f.trim().is_empty()) {
            debug!("fake: add form blocked by required-field validation");
            return;
        }
        let (Ok(price), Ok(quantity)) = (form.price.parse::<f64>(), form.quantity.parse::<i64>()) else {
            return;
        };

        let name = form.name.clone();
        {
            let mut state = self.app.state.lock();
            let id = state.next_id;
            state.next_id += 1;
            state.products.push(ProductRecord {
                id,
                name: name.clone(),
                category: form.category.clone(),
                description: form.description.clone(),
                price,
                quantity,
                dispatched: false,
            });
        }
        view.add_form = ProductFields::default();
        view.toast("Product added successfully", format!("{} has been added", name));
    }

    fn submit_update(&self, view: &mut View) {
        let Some(id) = view.selected else {
            view.toast("No product selected", "Please select a product to update".into());
            return;
        };
        let form = view.update_form.clone();
        let (Ok(price), Ok(quantity)) = (form.price.parse::<f64>(), form.quantity.parse::<i64>()) else {
            return;
        };
        let updated = {
            let mut state = self.app.state.lock();
            match state.products.iter_mut().find(|p| p.id == id) {
                Some(p) => {
                    p.name = form.name.clone();
                    p.description = form.description;
                    p.price = price;
                    p.quantity = quantity;
                    true
                }
                None => false,
            }
        };
        if updated {
            view.toast("Product updated successfully", format!("{} has been updated", form.name));
        }
    }

    fn select_option(&self, view: &mut View, index: usize) {
        match view.listbox.take() {
            Some(Listbox::Category) => {
                if let Some(category) = Category::ALL.get(index) {
                    view.add_form.category = category.label().to_string();
                }
            }
            Some(Listbox::Products) => {
                let state = self.app.state.lock();
                if let Some(p) = state.products.get(index) {
                    view.selected = Some(p.id);
                    view.update_form = ProductFields {
                        name: p.name.clone(),
                        category: p.category.clone(),
                        description: p.description.clone(),
                        price: p.price.to_string(),
                        quantity: p.quantity.to_string(),
                    };
                }
            }
            None => {}
        }
    }

    fn dispatch(&self, view: &mut View, id: u64) {
        let dispatched = {
            let mut state = self.app.state.lock();
            match state.products.iter_mut().find(|p| p.id == id) {
                Some(p) if p.quantity > 0 => {
                    p.dispatched = true;
                    p.quantity -= 1;
                    Some(p.name.clone())
                }
                _ => None,
            }
        };
        match dispatched {
            Some(name) => {
                view.toast("Product dispatched", format!("{} has been marked as dispatched", name))
            }
            None => view.toast("Cannot dispatch", "Product not found or out of stock".into()),
        }
    }

    fn confirm_delete(&self, view: &mut View) {
        let Some(id) = view.confirm_delete.take() else {
            return;
        };
        let removed = {
            let mut state = self.app.state.lock();
            let pos = state.products.iter().position(|p| p.id == id);
            pos.map(|pos| state.products.remove(pos))
        };
        if let Some(removed) = removed {
            view.toast(
                "Product deleted",
                format!("{} has been removed from inventory", removed.name),
            );
        }
    }
}

fn parse_id(id: &str, prefix: &str) -> Option<u64> {
    id.strip_prefix(prefix)?.parse().ok()
}

#[async_trait]
impl Driver for FakeBrowser {
    async fn maximize_window(&self) -> E2eResult<()> {
        Ok(())
    }

    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.app.record(format!("goto {}", url));
        let mut view = self.view.lock();
        if view.closed {
            return Err(E2eError::Driver("session is closed".into()));
        }
        self.goto_locked(&mut view, url);
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.view.lock().url.clone())
    }

    async fn refresh(&self) -> E2eResult<()> {
        let mut view = self.view.lock();
        let url = view.url.clone();
        self.goto_locked(&mut view, &url);
        Ok(())
    }

    async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<ElementHandle>> {
        Ok(self
            .visible_nodes()?
            .into_iter()
            .filter(|n| n.matches.contains(locator))
            .map(|n| ElementHandle::new(n.id))
            .collect())
    }

    async fn is_displayed(&self, element: &ElementHandle) -> E2eResult<bool> {
        self.node(element).map(|_| true)
    }

    async fn is_enabled(&self, element: &ElementHandle) -> E2eResult<bool> {
        let node = self.node(element)?;
        let state = self.app.state.lock();
        Ok(!node.matches.iter().any(|m| state.disabled.contains(m)))
    }

    async fn text(&self, element: &ElementHandle) -> E2eResult<String> {
        Ok(self.node(element)?.text)
    }

    async fn attr(&self, element: &ElementHandle, name: &str) -> E2eResult<Option<String>> {
        self.node(element)?;
        if name != "value" {
            return Ok(None);
        }
        let mut view = self.view.lock();
        Ok(Self::field(&mut view, element.id()).map(|f| f.clone()))
    }

    async fn clear(&self, element: &ElementHandle) -> E2eResult<()> {
        self.node(element)?;
        let mut view = self.view.lock();
        if let Some(field) = Self::field(&mut view, element.id()) {
            field.clear();
        }
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> E2eResult<()> {
        self.node(element)?;
        let mut view = self.view.lock();
        match Self::field(&mut view, element.id()) {
            Some(field) => {
                field.push_str(text);
                Ok(())
            }
            None => Err(E2eError::Driver(format!("element {} is not editable", element))),
        }
    }

    async fn click(&self, element: &ElementHandle) -> E2eResult<()> {
        let node = self.node(element)?;
        let mut view = self.view.lock();
        let id = node.id.as_str();

        if let Some(label) = id.strip_prefix("tab:") {
            if let Some(tab) = Tab::ALL.into_iter().find(|t| t.label() == label) {
                view.switch_tab(tab);
            }
            return Ok(());
        }
        if let Some(index) = parse_id(id, "opt:") {
            self.select_option(&mut view, index as usize);
            return Ok(());
        }
        if let Some(pid) = parse_id(id, "del:") {
            view.confirm_delete = Some(pid);
            return Ok(());
        }
        if let Some(pid) = parse_id(id, "dsp:") {
            self.dispatch(&mut view, pid);
            return Ok(());
        }

        match id {
            "login:submit" => self.submit_login(&mut view),
            "logout" => {
                view.authenticated = false;
                let url = self.app.base_url.clone();
                view.reload(url);
            }
            "add:category-select" => view.toggle_listbox(Listbox::Category),
            "upd:select" => view.toggle_listbox(Listbox::Products),
            "add:submit" => self.submit_add(&mut view),
            "upd:submit" => self.submit_update(&mut view),
            "dlg:cancel" => view.confirm_delete = None,
            "dlg:confirm" => self.confirm_delete(&mut view),
            _ => {}
        }
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        {
            let mut view = self.view.lock();
            if view.closed {
                return Err(E2eError::Driver("session already closed".into()));
            }
            view.closed = true;
        }
        let mut state = self.app.state.lock();
        state.closes += 1;
        state.journal.push("close".into());
        Ok(())
    }
}
