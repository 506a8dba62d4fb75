use cancelwatch_core::OrderRow;

pub fn print_rows(rows: &[OrderRow]) {
    if rows.is_empty() {
        println!("No orders found.");
        return;
    }
    for row in rows {
        let cancel = match &row.countdown {
            Some(left) => format!("Time left to cancel: {left}"),
            None => row.cancel_label.to_string(),
        };
        println!(
            "{:<26} {:<30} x{:<3} {:<10} {}",
            row.order_id, row.product_name, row.quantity, row.status, cancel
        );
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
