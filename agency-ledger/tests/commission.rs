mod helpers;

use rust_decimal_macros::dec;

use agency_ledger::{
    commission::{error::CommissionError, CommissionStatus, NewCommission},
    movement::MovementType,
    *,
};

#[tokio::test]
async fn pays_pending_commission() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(1000)).await?;
    let seller_id = SellerId::new();
    let commission = ledger
        .commissions()
        .create(
            NewCommission::builder()
                .seller_id(seller_id)
                .amount(dec!(250))
                .currency(Currency::Local)
                .build()?,
        )
        .await?;

    let paid = ledger
        .pay_commission(
            commission.id,
            account.id,
            dec!(250),
            Currency::Local,
            helpers::date(2024, 3, 1),
            None,
        )
        .await?;

    assert_eq!(paid.status, CommissionStatus::Paid);
    assert!(paid.paid_at.is_some());
    let movement_id = paid.movement_id.expect("paid commission references its movement");
    let movement = ledger.movements().find(movement_id).await?;
    assert_eq!(movement.movement_type, MovementType::Commission);
    assert_eq!(movement.seller_id, Some(seller_id));
    assert_eq!(ledger.get_balance(account.id).await?, dec!(750));
    assert_eq!(ledger.commissions().find(commission.id).await?, paid);
    Ok(())
}

#[tokio::test]
async fn paying_twice_fails_without_side_effects() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(1000)).await?;
    let commission = ledger
        .commissions()
        .create(
            NewCommission::builder()
                .seller_id(SellerId::new())
                .amount(dec!(100))
                .currency(Currency::Local)
                .build()?,
        )
        .await?;
    let paid = ledger
        .pay_commission(
            commission.id,
            account.id,
            dec!(100),
            Currency::Local,
            helpers::date(2024, 3, 1),
            None,
        )
        .await?;

    let err = ledger
        .pay_commission(
            commission.id,
            account.id,
            dec!(100),
            Currency::Local,
            helpers::date(2024, 3, 2),
            None,
        )
        .await
        .expect_err("second payment must fail");

    assert!(matches!(
        err,
        LedgerError::CommissionError(CommissionError::AlreadyPaid(id)) if id == commission.id
    ));
    assert_eq!(err.kind(), ErrorKind::AlreadyPaid);
    assert!(err.to_string().contains("La comisión ya está pagada"));
    assert_eq!(ledger.movements().list_for_account(account.id).await?.len(), 1);
    assert_eq!(ledger.commissions().find(commission.id).await?, paid);
    Ok(())
}

#[tokio::test]
async fn insufficient_balance_keeps_commission_pending() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(50)).await?;
    let commission = ledger
        .commissions()
        .create(
            NewCommission::builder()
                .seller_id(SellerId::new())
                .amount(dec!(100))
                .currency(Currency::Local)
                .build()?,
        )
        .await?;

    let err = ledger
        .pay_commission(
            commission.id,
            account.id,
            dec!(100),
            Currency::Local,
            helpers::date(2024, 3, 1),
            None,
        )
        .await
        .expect_err("not enough funds");
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);

    let stored = ledger.commissions().find(commission.id).await?;
    assert_eq!(stored.status, CommissionStatus::Pending);
    assert!(stored.movement_id.is_none());
    assert!(ledger.movements().list_for_account(account.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn commission_currency_must_match_account() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(1000)).await?;
    let commission = ledger
        .commissions()
        .create(
            NewCommission::builder()
                .seller_id(SellerId::new())
                .amount(dec!(10))
                .currency(Currency::Reference)
                .build()?,
        )
        .await?;

    let err = ledger
        .pay_commission(
            commission.id,
            account.id,
            dec!(10),
            Currency::Reference,
            helpers::date(2024, 3, 1),
            None,
        )
        .await
        .expect_err("account holds LOCAL");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        ledger.commissions().find(commission.id).await?.status,
        CommissionStatus::Pending
    );
    Ok(())
}

#[tokio::test]
async fn payout_figures_are_authoritative() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Reference, dec!(50)).await?;
    let commission = ledger
        .commissions()
        .create(
            NewCommission::builder()
                .seller_id(SellerId::new())
                .amount(dec!(25000))
                .currency(Currency::Local)
                .build()?,
        )
        .await?;

    let paid = ledger
        .pay_commission(
            commission.id,
            account.id,
            dec!(20),
            Currency::Reference,
            helpers::date(2024, 3, 1),
            None,
        )
        .await?;

    assert_eq!(paid.status, CommissionStatus::Paid);
    assert_eq!(paid.amount, dec!(25000));
    assert_eq!(paid.currency, Currency::Local);
    let movement_id = paid.movement_id.expect("paid commission references its movement");
    let movement = ledger.movements().find(movement_id).await?;
    assert_eq!(movement.currency, Currency::Reference);
    assert_eq!(movement.amount_original, dec!(20));
    assert_eq!(movement.exchange_rate, Some(helpers::RATE));
    assert_eq!(ledger.get_balance(account.id).await?, dec!(30));
    Ok(())
}
