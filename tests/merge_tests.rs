mod common;

use common::{engine, line};
use khata::domain::entry::PaymentStatus;
use khata::domain::ports::LedgerFilter;
use khata::error::LedgerError;

#[tokio::test]
async fn test_consecutive_sales_merge_into_one_entry() {
    let engine = engine();

    let first = engine.post_sale("c1", &[line("p1", 1)]).await.unwrap();
    let second = engine.post_sale("c1", &[line("p2", 1)]).await.unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.total.to_string(), "150.00");
    assert_eq!(second.status, PaymentStatus::Unpaid);
    assert_eq!(
        second.products.iter().cloned().collect::<Vec<_>>(),
        vec!["Bread".to_string(), "Cake".to_string()]
    );

    let open = engine
        .list_open_balances(&LedgerFilter::default())
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
}

#[tokio::test]
async fn test_duplicate_products_collapse() {
    let engine = engine();

    engine.post_sale("c1", &[line("p1", 2)]).await.unwrap();
    let entry = engine
        .post_sale("c1", &[line("p1", 1), line("p2", 1)])
        .await
        .unwrap();

    // 200 + 100 + 50
    assert_eq!(entry.total.to_string(), "350.00");
    assert_eq!(entry.products.len(), 2);
}

#[tokio::test]
async fn test_quantity_multiplies_unit_price() {
    let engine = engine();

    let entry = engine
        .post_sale("c2", &[line("p3", 3), line("p2", 2)])
        .await
        .unwrap();

    // 3 * 30 + 2 * 50
    assert_eq!(entry.total.to_string(), "190.00");
}

#[tokio::test]
async fn test_customers_get_separate_entries() {
    let engine = engine();

    let a = engine.post_sale("c1", &[line("p1", 1)]).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let b = engine.post_sale("c2", &[line("p2", 1)]).await.unwrap();
    assert_ne!(a.id, b.id);

    let open = engine
        .list_open_balances(&LedgerFilter::default())
        .await
        .unwrap();
    assert_eq!(open.len(), 2);
    // Newest mutation first.
    assert_eq!(open[0].customer_id, "c2");
    assert_eq!(open[1].customer_id, "c1");
}

#[tokio::test]
async fn test_filter_by_id_and_name() {
    let engine = engine();
    engine.post_sale("c1", &[line("p1", 1)]).await.unwrap();
    engine.post_sale("c2", &[line("p2", 1)]).await.unwrap();

    let by_id = engine
        .list_open_balances(&LedgerFilter::by_customer_id("c1"))
        .await
        .unwrap();
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].customer.name, "Asha");

    // Case-insensitive substring match on the display name.
    let by_name = engine
        .list_open_balances(&LedgerFilter::by_customer_name("bIn"))
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].customer_id, "c2");

    let none = engine
        .list_open_balances(&LedgerFilter::by_customer_name("nobody"))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_snapshot_captured_on_entry() {
    let engine = engine();
    let entry = engine.post_sale("c1", &[line("p1", 1)]).await.unwrap();

    assert_eq!(entry.customer.name, "Asha");
    assert_eq!(entry.customer.contact, "555-0101");
    assert_eq!(entry.customer.address, "12 Main St");
}

#[tokio::test]
async fn test_empty_lines_rejected() {
    let engine = engine();
    let result = engine.post_sale("c1", &[]).await;
    assert!(matches!(result, Err(LedgerError::Validation(_))));
}

#[tokio::test]
async fn test_zero_total_sale_rejected() {
    let engine = engine();

    // A sale of only zero-priced items would open an entry with a zero
    // total that no payment could ever settle.
    let result = engine.post_sale("c1", &[line("p0", 2)]).await;
    assert!(matches!(result, Err(LedgerError::Validation(_))));
    assert!(engine.open_entry("c1").await.unwrap().is_none());
    assert!(engine.recorded_sales().await.unwrap().is_empty());

    // Zero-priced items alongside a real charge are fine.
    let entry = engine
        .post_sale("c1", &[line("p0", 1), line("p1", 1)])
        .await
        .unwrap();
    assert_eq!(entry.total.to_string(), "100.00");
    assert!(entry.products.contains("Sample"));
}

#[tokio::test]
async fn test_zero_quantity_rejected() {
    let engine = engine();
    let result = engine.post_sale("c1", &[line("p1", 0)]).await;
    assert!(matches!(result, Err(LedgerError::Validation(_))));
}

#[tokio::test]
async fn test_unknown_customer_rejected() {
    let engine = engine();
    let result = engine.post_sale("ghost", &[line("p1", 1)]).await;
    assert!(matches!(
        result,
        Err(LedgerError::NotFound { kind: "customer", .. })
    ));
}

#[tokio::test]
async fn test_unknown_product_rejected_without_side_effects() {
    let engine = engine();
    let result = engine.post_sale("c1", &[line("p1", 1), line("p9", 1)]).await;
    assert!(matches!(
        result,
        Err(LedgerError::NotFound { kind: "product", .. })
    ));

    // The failed posting left no trace.
    assert!(engine.open_entry("c1").await.unwrap().is_none());
    assert!(engine.recorded_sales().await.unwrap().is_empty());
}
