mod helpers;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use agency_ledger::{account::FinancialAccount, balance::error::BalanceError, movement::*, *};

#[tokio::test]
async fn local_balance_sums_equivalents() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(1000)).await?;

    ledger
        .create_movement(helpers::movement(&account, MovementType::Income, dec!(500)))
        .await?;
    ledger
        .create_movement(helpers::movement(&account, MovementType::Expense, dec!(200)))
        .await?;

    assert_eq!(ledger.get_balance(account.id).await?, dec!(1300));
    Ok(())
}

#[tokio::test]
async fn reference_balance_sums_original_amounts() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Reference, dec!(100)).await?;

    let movement = ledger
        .create_movement(helpers::movement(&account, MovementType::Income, dec!(50)))
        .await?;
    assert_eq!(movement.amount_equivalent, dec!(50000));

    assert_eq!(ledger.get_balance(account.id).await?, dec!(150));
    Ok(())
}

#[tokio::test]
async fn every_movement_type_is_signed() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(10000)).await?;

    let mut expected = dec!(10000);
    for movement_type in [
        MovementType::Income,
        MovementType::FxGain,
        MovementType::Expense,
        MovementType::FxLoss,
        MovementType::Commission,
        MovementType::OperatorPayment,
    ] {
        ledger
            .create_movement(helpers::movement(&account, movement_type, dec!(100)))
            .await?;
        expected = movement_type.apply_sign(dec!(100)) + expected;
        assert_eq!(ledger.get_balance(account.id).await?, expected);
    }
    assert_eq!(expected, dec!(9800));
    Ok(())
}

#[tokio::test]
async fn batch_matches_single_balances() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let local = helpers::create_account(&ledger, Currency::Local, dec!(1000)).await?;
    let reference = helpers::create_account(&ledger, Currency::Reference, dec!(100)).await?;
    let untouched = helpers::create_account(&ledger, Currency::Local, dec!(42)).await?;

    ledger
        .create_movement(helpers::movement(&local, MovementType::Expense, dec!(250)))
        .await?;
    ledger
        .create_movement(helpers::movement(&reference, MovementType::Income, dec!(25)))
        .await?;

    let unknown = FinancialAccountId::new();
    let balances = ledger
        .get_balances_batch(&[local.id, reference.id, untouched.id, unknown])
        .await?;

    assert_eq!(balances.len(), 3);
    assert_eq!(balances[&local.id], dec!(750));
    assert_eq!(balances[&reference.id], dec!(125));
    assert_eq!(balances[&untouched.id], dec!(42));
    assert!(!balances.contains_key(&unknown));
    for (id, balance) in balances {
        assert_eq!(ledger.get_balance(id).await?, balance);
    }
    Ok(())
}

fn reference_income(account: &FinancialAccount, amount: Decimal) -> NewLedgerMovement {
    NewLedgerMovement::builder()
        .movement_type(MovementType::Income)
        .account_id(account.id)
        .currency(Currency::Reference)
        .amount_original(amount)
        .exchange_rate(dec!(1))
        .build()
        .unwrap()
}

#[tokio::test]
async fn batch_reports_initial_balance_for_failing_account() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let healthy = helpers::create_account(&ledger, Currency::Local, dec!(1000)).await?;
    let saturated = helpers::create_account(&ledger, Currency::Reference, dec!(7)).await?;
    ledger
        .create_movement(helpers::movement(&healthy, MovementType::Income, dec!(500)))
        .await?;
    ledger
        .create_movement(reference_income(&saturated, Decimal::MAX - dec!(7)))
        .await?;
    ledger
        .create_movement(reference_income(&saturated, dec!(10)))
        .await?;

    let err = ledger.get_balance(saturated.id).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::BalanceError(BalanceError::Overflow(id)) if id == saturated.id
    ));

    let balances = ledger
        .get_balances_batch(&[healthy.id, saturated.id])
        .await?;
    assert_eq!(balances[&healthy.id], dec!(1500));
    assert_eq!(balances[&saturated.id], dec!(7));
    Ok(())
}

#[tokio::test]
async fn oversized_equivalent_is_rejected_without_writing() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Reference, dec!(0)).await?;
    let new_movement = NewLedgerMovement::builder()
        .movement_type(MovementType::Income)
        .account_id(account.id)
        .currency(Currency::Reference)
        .amount_original(dec!(100000000000000000000000000))
        .exchange_rate(dec!(1000))
        .build()?;

    let err = ledger.create_movement(new_movement).await.unwrap_err();

    assert!(matches!(
        err,
        LedgerError::MovementError(movement::error::MovementError::Overflow { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(ledger.movements().list_for_account(account.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn reports_shortfall() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(100)).await?;

    let check = ledger
        .validate_sufficient_balance(account.id, dec!(150), Currency::Local)
        .await?;
    assert!(!check.valid);
    assert_eq!(check.shortfall, dec!(50));
    assert!(matches!(
        check.error(),
        Some(BalanceError::InsufficientBalance { shortfall, .. }) if shortfall == dec!(50)
    ));

    let check = ledger
        .validate_sufficient_balance(account.id, dec!(100), Currency::Local)
        .await?;
    assert!(check.valid);
    assert_eq!(check.shortfall, Decimal::ZERO);
    Ok(())
}

#[tokio::test]
async fn validating_in_wrong_currency_fails() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(100)).await?;

    let res = ledger
        .validate_sufficient_balance(account.id, dec!(10), Currency::Reference)
        .await;
    assert!(matches!(
        res,
        Err(LedgerError::BalanceError(BalanceError::CurrencyMismatch { .. }))
    ));
    Ok(())
}

#[tokio::test]
async fn debits_cannot_overdraw() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(100)).await?;

    let res = ledger
        .create_movement(helpers::movement(&account, MovementType::Expense, dec!(100.5)))
        .await;
    let err = res.expect_err("debit above balance must fail");
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert!(err.to_string().contains("Saldo insuficiente"));

    assert!(ledger.movements().list_for_account(account.id).await?.is_empty());
    assert_eq!(ledger.get_balance(account.id).await?, dec!(100));
    Ok(())
}

#[tokio::test]
async fn movement_currency_must_match_account() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(100)).await?;

    let new_movement = NewLedgerMovement::builder()
        .movement_type(MovementType::Income)
        .account_id(account.id)
        .currency(Currency::Reference)
        .amount_original(dec!(10))
        .exchange_rate(helpers::RATE)
        .build()?;
    let err = ledger
        .create_movement(new_movement)
        .await
        .expect_err("currency mismatch must fail");
    assert_eq!(err.kind(), ErrorKind::Validation);
    Ok(())
}

#[tokio::test]
async fn inactive_accounts_reject_movements() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(0)).await?;
    ledger
        .close_account(account.id, None, helpers::date(2024, 1, 5), None)
        .await?;

    let err = ledger
        .create_movement(helpers::movement(&account, MovementType::Income, dec!(10)))
        .await
        .expect_err("inactive account must reject movements");
    assert_eq!(err.kind(), ErrorKind::Validation);
    Ok(())
}

#[tokio::test]
async fn concurrent_debits_never_go_negative() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(100)).await?;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let ledger = ledger.clone();
            let debit = helpers::movement(&account, MovementType::Expense, dec!(30));
            tokio::spawn(async move { ledger.create_movement(debit).await })
        })
        .collect();

    let mut accepted = 0;
    for result in futures::future::join_all(handles).await {
        match result? {
            Ok(_) => accepted += 1,
            Err(err) => assert_eq!(err.kind(), ErrorKind::InsufficientBalance),
        }
    }

    assert_eq!(accepted, 3);
    assert_eq!(ledger.get_balance(account.id).await?, dec!(10));
    Ok(())
}
