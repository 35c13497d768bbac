//! Payment gateway driven from the terminal
//!
//! Prints the checkout options and reads back the fields the gateway
//! reports on success. An empty payment id counts as closing the widget.

use std::io::Write;

use async_trait::async_trait;
use ottsonly_client::error::{Error, Result};
use ottsonly_client::wallet::{CheckoutOptions, GatewayOutcome, PaymentGateway, VerifyPaymentRequest};
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

pub struct TerminalGateway;

async fn prompt(reader: &mut BufReader<Stdin>, label: &str) -> Result<String> {
    print!("{}: ", label);
    std::io::stdout().flush().map_err(Error::gateway)?;

    let mut line = String::new();
    reader.read_line(&mut line).await.map_err(Error::gateway)?;
    Ok(line.trim().to_string())
}

#[async_trait]
impl PaymentGateway for TerminalGateway {
    async fn checkout(&self, options: &CheckoutOptions) -> Result<GatewayOutcome> {
        println!("Complete the payment with these checkout options:");
        println!("{}", serde_json::to_string_pretty(options)?);

        let mut reader = BufReader::new(tokio::io::stdin());
        let payment_id = prompt(&mut reader, "razorpay_payment_id (empty to cancel)").await?;
        if payment_id.is_empty() {
            return Ok(GatewayOutcome::Dismissed);
        }
        let signature = prompt(&mut reader, "razorpay_signature").await?;

        Ok(GatewayOutcome::Paid(VerifyPaymentRequest {
            razorpay_order_id: options.order_id.clone(),
            razorpay_payment_id: payment_id,
            razorpay_signature: signature,
        }))
    }
}
