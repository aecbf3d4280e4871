//! Invariants of the scoring engine and reason generator over generated profiles.

use loan_eligibility::workflows::eligibility::{
    reason_codes, score, ApplicantProfile, IneligibilityReason,
};
use proptest::prelude::*;

fn loan_status() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("paid".to_string()),
        Just(" Closed ".to_string()),
        Just("DEFAULT".to_string()),
        Just("charged off".to_string()),
        Just("rejected".to_string()),
        "[a-z ]{0,12}",
    ]
}

prop_compose! {
    fn any_profile()(
        salary in prop::num::f64::ANY,
        emi in -1e6f64..1e7,
        savings in -1e6f64..1e8,
        collateral in prop::num::f64::ANY,
        utilization in -50f64..250.0,
        years in -5f64..60.0,
        status in loan_status(),
        balance in any::<bool>(),
        late in any::<bool>(),
        cards in any::<u32>(),
        loan in -1e6f64..1e9,
        insurance in any::<bool>(),
    ) -> ApplicantProfile {
        ApplicantProfile {
            annual_salary: salary,
            total_emi_amount_per_month: emi,
            savings_balance: savings,
            collateral_value: collateral,
            avg_credit_utilization_pct: utilization,
            years_of_employment: years,
            previous_loan_status: status,
            previous_balance_flag: balance,
            late_payment_history: late,
            num_credit_cards: cards,
            loan_amount: loan,
            wants_loan_insurance: insurance,
            ..ApplicantProfile::default()
        }
    }
}

prop_compose! {
    /// Profiles for which none of the specific reason checks fire.
    fn untroubled_profile()(
        salary in 180_000f64..5e7,
        loan_share in 0f64..2.5,
        emi_share in 0f64..0.5,
        utilization in 0f64..=60.0,
        cards in 0u32..6,
        status in loan_status(),
    ) -> ApplicantProfile {
        ApplicantProfile {
            annual_salary: salary,
            loan_amount: salary * loan_share,
            total_emi_amount_per_month: salary / 12.0 * emi_share,
            avg_credit_utilization_pct: utilization,
            num_credit_cards: cards,
            previous_loan_status: status,
            ..ApplicantProfile::default()
        }
    }
}

proptest! {
    #[test]
    fn score_stays_within_unit_interval(profile in any_profile()) {
        let probability = score(&profile);
        prop_assert!((0.0..=1.0).contains(&probability), "score {probability} out of range");
    }

    #[test]
    fn higher_salary_never_lowers_score(
        profile in any_profile(),
        low in 1f64..5e6,
        raise in 0f64..5e6,
    ) {
        let poorer = ApplicantProfile { annual_salary: low, ..profile.clone() };
        let richer = ApplicantProfile { annual_salary: low + raise, ..profile };
        prop_assert!(score(&richer) >= score(&poorer));
    }

    #[test]
    fn no_specific_triggers_means_no_reasons_at_or_above_threshold(
        profile in untroubled_profile(),
        probability in 0.5f64..=1.0,
    ) {
        prop_assert!(reason_codes(&profile, probability).is_empty());
    }

    #[test]
    fn no_specific_triggers_falls_back_to_generic_reason_below_threshold(
        profile in untroubled_profile(),
        probability in 0f64..0.5,
    ) {
        prop_assert_eq!(
            reason_codes(&profile, probability),
            vec![IneligibilityReason::GeneralInstability]
        );
    }

    #[test]
    fn late_payments_are_always_reported(mut profile in any_profile(), probability in 0f64..=1.0) {
        profile.late_payment_history = true;
        prop_assert!(reason_codes(&profile, probability)
            .contains(&IneligibilityReason::LatePaymentHistory));
    }
}
