//! Example: page-object lifecycle over a mocked marketing site
//!
//! Demonstrates: routing registration, a first-load page object, a hover
//! menu traversal, and the diagnostics/event trail a transition leaves.
//!
//! Run with: `cargo run --example site_navigation`

use navegar::{
    AuthMode, CaptureConfig, Check, IdentityCheck, Locator, MenuOpen, MenuTarget, MockDriver,
    NavegarResult, PageDefinition, PageObject, PageOptions, PageState, RoutingTable, RunContext,
    Session,
};

fn home_definition() -> PageDefinition {
    PageDefinition::new("home", "https://acme.example/")
        .with_title("Acme")
        .with_identity_check(IdentityCheck::Url)
        .with_load_check(Check::present(Locator::css("h1.home")))
        .with_unload_check(Check::absent(Locator::css("h1.home")))
        .with_nav_target(
            "pricing",
            MenuTarget::new(Locator::css("nav .products"))
                .opened_by(MenuOpen::Hover)
                .with_stage2(Locator::css("nav .products a.pricing"))
                .with_scroll_to(0, 0),
        )
}

fn pricing_definition() -> PageDefinition {
    PageDefinition::new("pricing", "https://acme.example/pricing")
        .with_title("Acme Pricing")
        .with_identity_check(IdentityCheck::Url)
        .with_identity_check(IdentityCheck::Title)
        .with_load_check(Check::present(Locator::css("h1.pricing")))
}

fn main() -> NavegarResult<()> {
    navegar::init_logging();

    println!("=== Site Navigation Example ===\n");

    // 1. Register the site's pages in the noauth namespace
    let mut routing = RoutingTable::new();
    routing.register(AuthMode::NoAuth, "home", home_definition)?;
    routing.register(AuthMode::NoAuth, "pricing", pricing_definition)?;
    println!("1. Registered {} pages", routing.len());

    let ctx = RunContext::builder("site_navigation_example")
        .with_capture(CaptureConfig::none())
        .with_routing(routing)
        .build();

    // 2. A scripted browser session standing in for the real site
    let menu = Locator::css("nav .products");
    let link = Locator::css("nav .products a.pricing");
    let session = Session::new(
        MockDriver::new()
            .with_page("https://acme.example/", "Acme")
            .with_element(Locator::css("h1.home"))
            .with_element(menu.clone())
            .on_hover(menu, vec![link.clone()])
            .on_activate(
                link,
                PageState::new("https://acme.example/pricing", "Acme Pricing")
                    .with_element(Locator::css("h1.pricing"))
                    .without_element(Locator::css("h1.home")),
            ),
    );

    // 3. Open the starting page (first load: no unload checks apply)
    let home = PageObject::open(
        home_definition(),
        session.handle(),
        ctx.clone(),
        PageOptions::firstload(),
    )?;
    println!("2. Opened '{}' at {}", home.name(), home.current_url()?);

    // 4. Traverse the hover menu to the pricing page
    let pricing = home.select_page_from_top_menu("pricing", false, PageOptions::new())?;
    println!("3. Landed on '{}' at {}", pricing.name(), pricing.current_url()?);

    // 5. The event trail the run recorded
    println!("\n4. Event trail:");
    for event in ctx.events() {
        println!("   [{}] {} ({})", event.seq, event.description, event.page);
    }

    println!("\nSession quits automatically when it drops.");
    Ok(())
}
