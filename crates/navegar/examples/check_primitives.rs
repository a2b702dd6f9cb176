//! Example: check primitive semantics
//!
//! Demonstrates: URL inclusion vs exact matching, URL chunk sets, title
//! waits, and element checks that report failures instead of raising.
//!
//! Run with: `cargo run --example check_primitives`

use navegar::{
    check_exact_url, check_title, check_url, check_url_chunks, expect_element_to_be_gone,
    expect_element_to_be_present, Locator, MockDriver, NavegarResult, WaitOptions,
};

fn main() -> NavegarResult<()> {
    println!("=== Check Primitives Example ===\n");

    let driver = MockDriver::new()
        .with_page("https://acme.example/pricing?ref=nav", "Acme Pricing")
        .with_element(Locator::css("h1.pricing"))
        .into_handle();
    let opts = WaitOptions::new().with_timeout(500).with_poll_interval(50);

    // URL inclusion tolerates query strings; exact matching does not
    println!("1. URL checks against https://acme.example/pricing?ref=nav");
    println!("   check_url(\"/pricing\")        -> {}", check_url(&driver, "/pricing")?);
    println!(
        "   check_exact_url(\"...\" )       -> {}",
        check_exact_url(&driver, "https://acme.example/pricing")?
    );

    // Chunk sets answer one boolean per chunk
    println!("\n2. URL chunks:");
    for (chunk, hit) in check_url_chunks(
        &driver,
        &["acme.example".to_string(), "/checkout".to_string()],
    )? {
        println!("   {chunk:<16} -> {hit}");
    }

    // Title checks wait (bounded) for equality
    println!("\n3. Title checks:");
    println!(
        "   \"Acme Pricing\" -> {}",
        check_title(&driver, "Acme Pricing", &opts)?
    );
    println!("   \"Checkout\"     -> {}", check_title(&driver, "Checkout", &opts)?);

    // Element checks batch failures rather than raising
    println!("\n4. Element checks:");
    let present = expect_element_to_be_present(&driver, &Locator::css("h1.pricing"), &opts)?;
    println!("   h1.pricing present -> {}", present.is_none());
    if let Some(failure) = expect_element_to_be_gone(&driver, &Locator::css("h1.pricing"), &opts)? {
        println!("   h1.pricing gone    -> failed: {failure}");
    }

    Ok(())
}
