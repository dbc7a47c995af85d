mod helpers;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use agency_ledger::{
    movement::{MovementType, NewLedgerMovement},
    operation::NewOperation,
    *,
};

fn lead_movement(
    account: &agency_ledger::account::FinancialAccount,
    movement_type: MovementType,
    amount: Decimal,
    lead_id: LeadId,
) -> anyhow::Result<NewLedgerMovement> {
    Ok(NewLedgerMovement::builder()
        .movement_type(movement_type)
        .account_id(account.id)
        .currency(account.currency)
        .amount_original(amount)
        .lead_id(lead_id)
        .build()?)
}

#[tokio::test]
async fn moves_every_lead_movement() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(1000)).await?;
    let lead_id = LeadId::new();
    let other_lead = LeadId::new();

    ledger
        .create_movement(lead_movement(&account, MovementType::Income, dec!(300), lead_id)?)
        .await?;
    ledger
        .create_movement(lead_movement(&account, MovementType::Expense, dec!(120), lead_id)?)
        .await?;
    ledger
        .create_movement(lead_movement(&account, MovementType::Income, dec!(5), other_lead)?)
        .await?;
    let balance_before = ledger.get_balance(account.id).await?;

    let operation = ledger
        .operations()
        .create(
            NewOperation::builder()
                .agency_id(account.agency_id)
                .lead_id(lead_id)
                .sale_amount(dec!(1000))
                .build()?,
        )
        .await?;

    let moved = ledger
        .reattribute_lead_to_operation(lead_id, operation.id)
        .await?;
    assert_eq!(moved, 2);

    assert!(ledger.movements().list_for_lead(lead_id).await?.is_empty());
    let attributed = ledger.movements().list_for_operation(operation.id).await?;
    assert_eq!(attributed.len(), 2);
    assert!(attributed.iter().all(|m| m.lead_id.is_none()));
    let signed: Decimal = attributed
        .iter()
        .map(|m| m.signed_amount(account.currency))
        .sum();
    assert_eq!(signed, dec!(180));

    assert_eq!(ledger.movements().list_for_lead(other_lead).await?.len(), 1);
    assert_eq!(ledger.get_balance(account.id).await?, balance_before);
    Ok(())
}

#[tokio::test]
async fn unknown_operation_leaves_movements_untouched() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let account = helpers::create_account(&ledger, Currency::Local, dec!(0)).await?;
    let lead_id = LeadId::new();
    ledger
        .create_movement(lead_movement(&account, MovementType::Income, dec!(75), lead_id)?)
        .await?;

    let err = ledger
        .reattribute_lead_to_operation(lead_id, OperationId::new())
        .await
        .expect_err("operation does not exist");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(ledger.movements().list_for_lead(lead_id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn lead_without_movements_moves_nothing() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger();
    let operation = ledger
        .operations()
        .create(
            NewOperation::builder()
                .agency_id(AgencyId::new())
                .sale_amount(dec!(10))
                .build()?,
        )
        .await?;

    let moved = ledger
        .reattribute_lead_to_operation(LeadId::new(), operation.id)
        .await?;
    assert_eq!(moved, 0);
    Ok(())
}
