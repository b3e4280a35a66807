/// quick start - originate a loan, pay one installment late, then repay the rest and close
use p2p_lending_engine::chrono::{Duration, TimeZone, Utc};
use p2p_lending_engine::{
    InMemoryLoanRepository, LendingConfig, LoanApplication, LoanBook, Money, Rate,
    SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
    ));
    let control = time.test_control().ok_or("test clock expected")?;

    let mut book = LoanBook::new(InMemoryLoanRepository::new(), LendingConfig::default())?;

    // a $10,000 loan at 8% over 6 months
    let loan = book.create_loan(
        LoanApplication {
            creditor: Uuid::new_v4(),
            debtor: Uuid::new_v4(),
            amount: Money::from_major(10_000),
            interest_rate: Rate::from_percentage(8),
            term_months: 6,
        },
        &time,
    )?;
    let loan_id = loan.id.ok_or("loan was not saved")?;

    println!("schedule:");
    for payment in &loan.payments {
        println!("  {}  {}", payment.due_date, payment.amount);
    }

    // first installment is due 2024-02-15, pay it ten days late
    control.advance(Duration::days(41));
    let settlement = book.pay_payment(loan_id, loan.payments[0].id.ok_or("unsaved payment")?, &time)?;
    println!("paid {} days late", settlement.days_late);

    // settle the rest early and close
    for payment in &loan.payments[1..] {
        book.pay_payment(loan_id, payment.id.ok_or("unsaved payment")?, &time)?;
    }
    book.close_loan(loan_id, &time)?;

    println!("remaining debt: {}", book.remaining_debt(loan_id, &time)?);
    println!("{}", book.events().to_json()?);

    Ok(())
}
