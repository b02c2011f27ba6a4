use anyhow::Context;
use rust_decimal::Decimal;
use tracing::{error, info, Instrument};

use storefront::app_system::{setup_tracing, OrderSystem};
use storefront::config::AppConfig;
use storefront::domain::{
    CreateOrder, OrderItemRequest, OrderStatus, PatchOrder, PaymentMethod, ProductCategory,
    ProductCreate,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let config = AppConfig::from_env().context("loading configuration")?;
    info!("Starting storefront demo");

    let system = OrderSystem::start(&config);

    let span = tracing::info_span!("product_creation");
    let product = async {
        info!("Creating demo product");
        system
            .product_client
            .create_product(ProductCreate {
                name: "Mechanical Keyboard".into(),
                description: "Tenkeyless, hot-swappable switches".into(),
                price: Decimal::new(8900, 2),
                stock_quantity: 25,
                sku: format!("KB-{}", chrono::Utc::now().timestamp_millis()),
                category: ProductCategory::Electronics,
                brand: "Keyforge".into(),
                images: vec!["https://example.com/keyboard.jpg".into()],
                weight: Some(0.9),
                status: None,
            })
            .await
    }
    .instrument(span)
    .await?;
    info!(
        product_id = %product.record.id,
        stock = product.stock_quantity,
        "Product created successfully"
    );

    let span = tracing::info_span!("order_processing");
    let order_result = async {
        info!("Placing order");
        let order = system
            .order_client
            .create_order(CreateOrder {
                customer_id: "CUST-DEMO-001".into(),
                items: vec![OrderItemRequest {
                    product_id: product.record.id.clone(),
                    quantity: 3,
                }],
                payment_method: PaymentMethod::CreditCard,
                shipping_address: "1 Demo Road, Sample City".into(),
                note: Some("Leave at the door".into()),
            })
            .await?;
        info!(order_id = %order.record.id, total = %order.total_amount, "Order placed");

        let paid = PatchOrder {
            status: Some(OrderStatus::Paid),
            ..Default::default()
        };
        system.order_client.patch_order(order.record.id.clone(), paid).await?;

        let cancel = PatchOrder {
            status: Some(OrderStatus::Cancelled),
            ..Default::default()
        };
        system.order_client.patch_order(order.record.id.clone(), cancel).await
    }
    .instrument(span)
    .await;

    match order_result {
        Ok(order) => info!(
            order_id = %order.record.id,
            status = %order.status,
            "Order processed successfully"
        ),
        Err(e) => error!(error = %e, "Order processing failed"),
    }

    let product = system.product_client.get_product(product.record.id).await?;
    info!(stock = product.stock_quantity, status = %product.status, "Final stock level");

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
