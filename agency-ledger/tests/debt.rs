mod helpers;

use rust_decimal_macros::dec;

use agency_ledger::{
    debt::DebtFilters,
    operation::{NewOperation, OperationStatus},
    payment::{NewPayment, PaymentDirection},
    *,
};

#[tokio::test]
async fn customer_debts_use_historical_rates() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    ledger
        .exchange_rates()
        .set_rate(helpers::date(2024, 6, 1), dec!(1000))
        .await?;
    ledger
        .exchange_rates()
        .set_rate(helpers::date(2024, 8, 1), dec!(1250))
        .await?;
    let agency_id = AgencyId::new();
    let customer = CustomerId::new();
    let small_customer = CustomerId::new();
    let account = helpers::create_account(&ledger, Currency::Reference, dec!(0)).await?;

    let local_sale = ledger
        .operations()
        .create(
            NewOperation::builder()
                .agency_id(agency_id)
                .customer_id(customer)
                .sale_amount(dec!(2000000))
                .sale_currency(Currency::Local)
                .departure_date(helpers::date(2024, 6, 1))
                .build()?,
        )
        .await?;
    let overpaid = ledger
        .operations()
        .create(
            NewOperation::builder()
                .agency_id(agency_id)
                .customer_id(customer)
                .sale_amount(dec!(300))
                .departure_date(helpers::date(2024, 8, 1))
                .build()?,
        )
        .await?;
    ledger
        .operations()
        .create(
            NewOperation::builder()
                .agency_id(agency_id)
                .customer_id(customer)
                .status(OperationStatus::Cancelled)
                .sale_amount(dec!(9999))
                .build()?,
        )
        .await?;
    ledger
        .operations()
        .create(
            NewOperation::builder()
                .agency_id(agency_id)
                .customer_id(small_customer)
                .sale_amount(dec!(100))
                .build()?,
        )
        .await?;

    for (operation_id, amount) in [(local_sale.id, dec!(500)), (overpaid.id, dec!(400))] {
        ledger
            .record_payment(
                NewPayment::builder()
                    .operation_id(operation_id)
                    .account_id(account.id)
                    .direction(PaymentDirection::Income)
                    .currency(Currency::Reference)
                    .amount(amount)
                    .paid_on(helpers::date(2024, 7, 15))
                    .build()?,
            )
            .await?;
    }

    let debts = ledger
        .aggregate_customer_debts(DebtFilters {
            agency_id: Some(agency_id),
            ..Default::default()
        })
        .await?;

    assert_eq!(debts.len(), 2);
    let largest = &debts[0];
    assert_eq!(largest.party_id, customer);
    assert_eq!(largest.total, dec!(2300));
    assert_eq!(largest.total_paid, dec!(900));
    assert_eq!(largest.outstanding, dec!(1500));
    assert_eq!(largest.operations.len(), 2);
    let converted = largest
        .operations
        .iter()
        .find(|op| op.operation_id == local_sale.id)
        .expect("local sale is part of the breakdown");
    assert_eq!(converted.exchange_rate, Some(dec!(1000)));
    assert_eq!(converted.total, dec!(2000));

    assert_eq!(debts[1].party_id, small_customer);
    assert_eq!(debts[1].outstanding, dec!(100));
    Ok(())
}

#[tokio::test]
async fn settled_customers_are_left_out() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let customer = CustomerId::new();
    let account = helpers::create_account(&ledger, Currency::Reference, dec!(0)).await?;
    let operation = ledger
        .operations()
        .create(
            NewOperation::builder()
                .agency_id(AgencyId::new())
                .customer_id(customer)
                .sale_amount(dec!(700))
                .build()?,
        )
        .await?;
    ledger
        .record_payment(
            NewPayment::builder()
                .operation_id(operation.id)
                .account_id(account.id)
                .direction(PaymentDirection::Income)
                .currency(Currency::Reference)
                .amount(dec!(700))
                .paid_on(helpers::date(2024, 7, 15))
                .build()?,
        )
        .await?;

    let debts = ledger
        .aggregate_customer_debts(DebtFilters {
            customer_id: Some(customer),
            ..Default::default()
        })
        .await?;
    assert!(debts.is_empty());
    Ok(())
}

#[tokio::test]
async fn operator_payables_mirror_customer_debts() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let operator = OperatorId::new();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(1000000)).await?;
    let operation = ledger
        .operations()
        .create(
            NewOperation::builder()
                .agency_id(AgencyId::new())
                .customer_id(CustomerId::new())
                .operator_id(operator)
                .sale_amount(dec!(1200))
                .operator_cost(dec!(800))
                .build()?,
        )
        .await?;
    ledger
        .record_payment(
            NewPayment::builder()
                .operation_id(operation.id)
                .account_id(account.id)
                .direction(PaymentDirection::Expense)
                .currency(Currency::Local)
                .amount(dec!(300000))
                .paid_on(helpers::date(2024, 7, 15))
                .build()?,
        )
        .await?;

    let payables = ledger
        .aggregate_operator_payables(DebtFilters {
            operator_id: Some(operator),
            ..Default::default()
        })
        .await?;
    assert_eq!(payables.len(), 1);
    assert_eq!(payables[0].party_id, operator);
    assert_eq!(payables[0].total, dec!(800));
    assert_eq!(payables[0].total_paid, dec!(300));
    assert_eq!(payables[0].outstanding, dec!(500));

    let customer_debts = ledger
        .aggregate_customer_debts(DebtFilters::default())
        .await?;
    assert_eq!(customer_debts.len(), 1);
    assert_eq!(customer_debts[0].outstanding, dec!(1200));
    Ok(())
}

#[tokio::test]
async fn missing_rates_fall_back_to_latest_and_payment_date() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger_without_fallback();
    let customer = CustomerId::new();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(0)).await?;
    let operation = ledger
        .operations()
        .create(
            NewOperation::builder()
                .agency_id(AgencyId::new())
                .customer_id(customer)
                .sale_amount(dec!(2400000))
                .sale_currency(Currency::Local)
                .departure_date(helpers::date(2024, 6, 20))
                .build()?,
        )
        .await?;

    // No rate is known yet, so the payment is stored without one.
    let payment = ledger
        .record_payment(
            NewPayment::builder()
                .operation_id(operation.id)
                .account_id(account.id)
                .direction(PaymentDirection::Income)
                .currency(Currency::Local)
                .amount(dec!(600000))
                .paid_on(helpers::date(2024, 6, 1))
                .build()?,
        )
        .await?;
    assert_eq!(payment.exchange_rate, None);
    assert_eq!(payment.amount_reference, None);

    ledger
        .exchange_rates()
        .set_rate(helpers::date(2024, 6, 1), dec!(1000))
        .await?;
    ledger
        .exchange_rates()
        .set_rate(helpers::date(2024, 7, 10), dec!(1200))
        .await?;

    let debts = ledger
        .aggregate_customer_debts(DebtFilters {
            customer_id: Some(customer),
            ..Default::default()
        })
        .await?;

    assert_eq!(debts.len(), 1);
    let breakdown = &debts[0].operations[0];
    assert_eq!(breakdown.rate_date, helpers::date(2024, 6, 20));
    assert_eq!(breakdown.exchange_rate, Some(dec!(1200)));
    assert_eq!(breakdown.total, dec!(2000));
    assert_eq!(breakdown.paid, dec!(600));
    assert_eq!(debts[0].outstanding, dec!(1400));
    Ok(())
}
