//! The ordered case sequence
//!
//! Cases share one browser session and one application, so later cases read
//! what earlier ones wrote: case 10 updates the product case 9 added, the
//! delete and dispatch cases act on whatever is first in their lists. The
//! registry keeps them in ascending order and refuses to run them otherwise.
//!
//! Inside a case, required steps propagate with `?`. Steps whose target
//! depends on earlier data match on a [`Probe`] and record a tolerated skip
//! when the target is absent.

use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::auth;
use crate::config::Credentials;
use crate::error::{E2eError, E2eResult};
use crate::locator::selectors;
use crate::panel::{self, Pick, Tab, SETTLE};
use crate::product::{Category, CategoryChoice, FixtureNames, ProductDraft};
use crate::session::Session;
use crate::wait::Probe;

pub type CaseFn = for<'a> fn(&'a Session, &'a CaseContext) -> BoxFuture<'a, E2eResult<()>>;

/// A numbered case in the sequence
#[derive(Clone, Copy)]
pub struct Case {
    pub number: u32,
    pub name: &'static str,
    pub run: CaseFn,
}

impl fmt::Debug for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("number", &self.number)
            .field("name", &self.name)
            .finish()
    }
}

/// Lines a case emitted while running
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseLog {
    pub progress: Vec<String>,
    pub skips: Vec<String>,
}

/// Per-case state handed to the case body
pub struct CaseContext {
    fixtures: FixtureNames,
    log: Mutex<CaseLog>,
}

impl CaseContext {
    pub fn new(fixtures: FixtureNames) -> Self {
        Self {
            fixtures,
            log: Mutex::new(CaseLog::default()),
        }
    }

    /// Name for a product this run creates
    pub fn fixture(&self, base: &str) -> String {
        self.fixtures.name(base)
    }

    pub fn progress(&self, line: impl Into<String>) {
        let line = line.into();
        info!("  {}", line);
        self.log.lock().progress.push(line);
    }

    /// Record an optional step that found nothing to act on
    pub fn skip(&self, step: &str, reason: impl fmt::Display) {
        let line = format!("{}: {}", step, reason);
        warn!("  Skipped {}", line);
        self.log.lock().skips.push(line);
    }

    pub fn into_log(self) -> CaseLog {
        self.log.into_inner()
    }
}

macro_rules! case {
    ($number:expr, $name:ident) => {
        Case {
            number: $number,
            name: stringify!($name),
            run: |session, cx| Box::pin($name(session, cx)),
        }
    };
}

/// Every case, in execution order
pub fn all_cases() -> Vec<Case> {
    vec![
        case!(1, login_valid_credentials),
        case!(2, login_invalid_username),
        case!(3, login_invalid_password),
        case!(4, login_empty_credentials),
        case!(5, logout_functionality),
        case!(6, add_product_complete),
        case!(7, add_product_incomplete),
        case!(8, view_inventory_after_add),
        case!(9, update_product_select),
        case!(10, update_product_modify),
        case!(11, delete_product_confirm),
        case!(12, delete_product_cancel),
        case!(13, dispatch_product),
        case!(14, dispatch_status_verification),
        case!(15, view_all_inventory),
        case!(16, tab_navigation),
        case!(17, add_multiple_products),
        case!(18, update_product_quantity),
        case!(19, session_persistence),
        case!(20, complete_workflow),
    ]
}

/// Cases must run in strictly ascending number order
pub fn ensure_ordered(cases: &[Case]) -> E2eResult<()> {
    for pair in cases.windows(2) {
        if pair[0].number >= pair[1].number {
            return Err(E2eError::InvalidConfig(format!(
                "case {} ({}) is scheduled after case {} ({})",
                pair[1].number, pair[1].name, pair[0].number, pair[0].name
            )));
        }
    }
    Ok(())
}

/// Narrow a case list to the given numbers and/or a name substring.
///
/// Empty `numbers` and no `name` keeps everything. Selection never reorders.
pub fn select(cases: Vec<Case>, numbers: &[u32], name: Option<&str>) -> E2eResult<Vec<Case>> {
    for n in numbers {
        if !cases.iter().any(|c| c.number == *n) {
            return Err(E2eError::UnknownCase(n.to_string()));
        }
    }
    let selected: Vec<Case> = cases
        .into_iter()
        .filter(|c| numbers.is_empty() || numbers.contains(&c.number))
        .filter(|c| name.map_or(true, |n| c.name.contains(n)))
        .collect();
    if selected.is_empty() {
        return Err(E2eError::UnknownCase(name.unwrap_or_default().to_string()));
    }
    Ok(selected)
}

async fn sign_in(session: &Session, cx: &CaseContext) {
    let outcome = auth::login_default(session).await;
    cx.progress(format!("Login: {}", outcome));
}

/// Submit the login form directly and check that the panel refused it
async fn expect_rejected_login(
    session: &Session,
    cx: &CaseContext,
    credentials: Option<Credentials>,
) -> E2eResult<()> {
    let wait = session.wait();
    let username = wait.until_present(&selectors::username_input()).await?;
    let password = session.find_now(&selectors::password_input()).await?;
    let driver = session.driver();
    driver.clear(&username).await?;
    driver.clear(&password).await?;
    if let Some(credentials) = &credentials {
        driver.send_keys(&username, &credentials.username).await?;
        driver.send_keys(&password, &credentials.password).await?;
    }
    session.click(&selectors::submit_button()).await?;

    let marker = &session.config().dashboard_marker;
    let settle = wait.with_timeout(SETTLE.min(wait.timeout()));
    match settle.until_url_contains(marker).await {
        Ok(url) => {
            return Err(E2eError::AssertionFailed(format!(
                "login was accepted, landed on {}",
                url
            )))
        }
        Err(E2eError::Timeout { .. }) => {}
        Err(e) => return Err(e),
    }
    if session.is_authenticated().await? {
        return Err(E2eError::AssertionFailed("session became authenticated".into()));
    }
    session.wait().until_present(&selectors::password_input()).await?;
    cx.progress("Login rejected, still on the login view");
    Ok(())
}

async fn login_valid_credentials(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    let outcome = auth::login_default(session).await;
    if !outcome.is_success() {
        return Err(E2eError::AssertionFailed(outcome.to_string()));
    }
    if !session.is_authenticated().await? {
        return Err(E2eError::AssertionFailed("not on the dashboard after login".into()));
    }
    session.wait().until_present(&selectors::dashboard_title()).await?;
    cx.progress("Logged in with valid credentials");
    Ok(())
}

async fn login_invalid_username(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    let password = session.config().credentials.password.clone();
    expect_rejected_login(session, cx, Some(Credentials::new("invaliduser", password))).await
}

async fn login_invalid_password(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    let username = session.config().credentials.username.clone();
    expect_rejected_login(session, cx, Some(Credentials::new(username, "wrongpassword"))).await
}

async fn login_empty_credentials(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    expect_rejected_login(session, cx, None).await
}

async fn logout_functionality(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    auth::logout(session).await;
    session.wait().until_present(&selectors::password_input()).await?;
    if session.is_authenticated().await? {
        return Err(E2eError::AssertionFailed("still on the dashboard after logout".into()));
    }
    cx.progress("Logged out, login form is back");
    Ok(())
}

async fn add_product_complete(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    panel::open_tab(session, Tab::AddProduct).await?;

    let draft = ProductDraft::complete(
        cx.fixture("Test Laptop"),
        Category::Electronics,
        "High performance laptop for testing",
        50000,
        10,
    );
    if !panel::add_product(session, &draft).await? {
        return Err(E2eError::AssertionFailed(format!(
            "'{}' was not acknowledged",
            draft.name
        )));
    }
    cx.progress(format!("Added '{}'", draft.name));
    Ok(())
}

async fn add_product_incomplete(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    panel::open_tab(session, Tab::AddProduct).await?;

    let draft = ProductDraft::name_only(cx.fixture("Incomplete Product"));
    if panel::add_product(session, &draft).await? {
        return Err(E2eError::AssertionFailed(
            "form accepted a product with empty required fields".into(),
        ));
    }
    session
        .wait()
        .until_present(&selectors::heading(Tab::AddProduct.heading()))
        .await?;
    cx.progress("Incomplete form was rejected");

    if panel::inventory_lists(session, &draft.name).await? {
        return Err(E2eError::AssertionFailed(format!(
            "'{}' shows up in the inventory",
            draft.name
        )));
    }
    cx.progress(format!("'{}' is not in the inventory", draft.name));
    Ok(())
}

async fn view_inventory_after_add(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    let view = panel::inventory(session).await?;
    if view.has_table {
        cx.progress(format!("Inventory table shows {} row(s)", view.rows));
    } else if view.empty {
        cx.skip("inventory table", "no products yet");
    } else {
        cx.skip("inventory table", "neither a table nor the empty message rendered");
    }
    Ok(())
}

async fn update_product_select(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    panel::open_tab(session, Tab::AddProduct).await?;
    let draft = ProductDraft::complete(
        cx.fixture("Product To Update"),
        Category::Clothing,
        "Original description",
        1000,
        50,
    );
    if panel::add_product(session, &draft).await? {
        cx.progress(format!("Added '{}'", draft.name));
    } else {
        cx.skip("seed product", format!("'{}' was not acknowledged", draft.name));
    }

    panel::open_tab(session, Tab::Update).await?;
    match panel::select_product(session, &Pick::First).await? {
        Probe::Found(label) => cx.progress(format!("Selected '{}' for update", label)),
        absent => cx.skip("select product", absent.reason().unwrap_or_default()),
    }
    Ok(())
}

async fn update_product_modify(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    panel::open_tab(session, Tab::Update).await?;
    let label = match panel::select_product(session, &Pick::First).await? {
        Probe::Found(label) => label,
        absent => {
            cx.skip("update price", absent.reason().unwrap_or_default());
            return Ok(());
        }
    };
    session.fill(&selectors::price_input(), "2000").await?;
    panel::submit_update(session).await?;
    cx.progress(format!(
        "Updated price of '{}' to 2000",
        panel::option_product_name(&label)
    ));
    Ok(())
}

async fn delete_product_confirm(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    panel::open_tab(session, Tab::Delete).await?;
    match panel::delete(session, &Pick::First, true).await? {
        Probe::Found(_) => cx.progress("Deleted the first product"),
        absent => cx.skip("delete product", absent.reason().unwrap_or_default()),
    }
    Ok(())
}

async fn delete_product_cancel(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    panel::open_tab(session, Tab::Delete).await?;
    match panel::delete(session, &Pick::First, false).await? {
        Probe::Found(_) => cx.progress("Cancelled deletion of the first product"),
        absent => cx.skip("cancel deletion", absent.reason().unwrap_or_default()),
    }
    Ok(())
}

async fn dispatch_product(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    panel::open_tab(session, Tab::Dispatch).await?;
    match panel::dispatch(session, &Pick::First).await? {
        Probe::Found(_) => cx.progress("Dispatched the first available product"),
        absent => cx.skip("dispatch product", absent.reason().unwrap_or_default()),
    }
    Ok(())
}

async fn dispatch_status_verification(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    let (dispatched, in_stock) = panel::status_tally(session).await?;
    if dispatched + in_stock == 0 {
        cx.skip("status badges", "inventory shows no status badges");
    } else {
        cx.progress(format!(
            "Status badges: {} dispatched, {} in stock",
            dispatched, in_stock
        ));
    }
    Ok(())
}

async fn view_all_inventory(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    let view = panel::inventory(session).await?;
    if view.cards > 0 {
        cx.progress(format!("Inventory shows {} summary card(s)", view.cards));
    } else {
        cx.skip("summary cards", "no cards rendered");
    }
    Ok(())
}

async fn tab_navigation(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    for tab in Tab::ALL {
        match panel::open_tab(session, tab).await {
            Ok(()) => cx.progress(format!("Navigated to {}", tab.label())),
            Err(e) if e.is_absence() => cx.skip(&format!("tab {}", tab.label()), e),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

async fn add_multiple_products(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    let drafts = [
        ProductDraft::complete(
            cx.fixture("Smartphone"),
            Category::Electronics,
            "Latest smartphone",
            30000,
            20,
        ),
        ProductDraft::complete(cx.fixture("T-Shirt"), Category::Clothing, "Cotton t-shirt", 500, 100),
        ProductDraft::complete(cx.fixture("Coffee Mug"), Category::Home, "Ceramic mug", 200, 50),
    ];

    for draft in &drafts {
        let added = async {
            panel::open_tab(session, Tab::AddProduct).await?;
            panel::add_product(session, draft).await
        }
        .await;
        match added {
            Ok(true) => cx.progress(format!("Added '{}'", draft.name)),
            Ok(false) => cx.skip(&format!("add '{}'", draft.name), "not acknowledged"),
            Err(e) if e.is_absence() => cx.skip(&format!("add '{}'", draft.name), e),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

async fn update_product_quantity(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    panel::open_tab(session, Tab::Update).await?;
    let label = match panel::select_product(session, &Pick::First).await? {
        Probe::Found(label) => label,
        absent => {
            cx.skip("update quantity", absent.reason().unwrap_or_default());
            return Ok(());
        }
    };
    let before = panel::input_value(session, &selectors::quantity_input()).await?;
    session.fill(&selectors::quantity_input(), "999").await?;
    panel::submit_update(session).await?;
    cx.progress(format!(
        "Updated quantity of '{}' from {} to 999",
        panel::option_product_name(&label),
        before
    ));
    Ok(())
}

async fn session_persistence(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    session.refresh().await?;
    match session.wait().probe_present(&selectors::dashboard_title()).await? {
        Probe::Found(_) => cx.progress("Session survived a page refresh"),
        absent => cx.skip("dashboard after refresh", absent.reason().unwrap_or_default()),
    }
    Ok(())
}

async fn complete_workflow(session: &Session, cx: &CaseContext) -> E2eResult<()> {
    sign_in(session, cx).await;
    let name = cx.fixture("Workflow Test Product");

    panel::open_tab(session, Tab::AddProduct).await?;
    let draft = ProductDraft::complete(
        name.clone(),
        Category::Electronics,
        "Testing complete workflow",
        5000,
        25,
    )
    .with_category(CategoryChoice::First);
    if !panel::add_product(session, &draft).await? {
        return Err(E2eError::AssertionFailed(format!("'{}' was not acknowledged", name)));
    }
    cx.progress(format!("Step 1: added '{}'", name));

    if panel::inventory_lists(session, &name).await? {
        cx.progress("Step 2: listed in the inventory");
    } else {
        cx.skip("step 2 inventory", format!("'{}' not listed", name));
    }

    panel::open_tab(session, Tab::Update).await?;
    match panel::select_product(session, &Pick::Named(name.clone())).await? {
        Probe::Found(_) => {
            session.fill(&selectors::price_input(), "6000").await?;
            panel::submit_update(session).await?;
            cx.progress("Step 3: price updated to 6000");
        }
        absent => cx.skip("step 3 update", absent.reason().unwrap_or_default()),
    }

    panel::open_tab(session, Tab::Dispatch).await?;
    match panel::dispatch(session, &Pick::Named(name.clone())).await? {
        Probe::Found(_) => match panel::inventory_status(session, &name).await {
            Ok(status) => cx.progress(format!("Step 4: dispatched, status now {}", status)),
            Err(e) if e.is_absence() => cx.skip("step 4 status", e),
            Err(e) => return Err(e),
        },
        absent => cx.skip("step 4 dispatch", absent.reason().unwrap_or_default()),
    }

    panel::open_tab(session, Tab::Delete).await?;
    match panel::delete(session, &Pick::Named(name.clone()), true).await? {
        Probe::Found(_) => cx.progress("Step 5: deleted"),
        absent => cx.skip("step 5 delete", absent.reason().unwrap_or_default()),
    }
    Ok(())
}
