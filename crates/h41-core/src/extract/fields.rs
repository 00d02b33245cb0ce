//! Built-in field catalog.

use crate::domain::{FieldMode, FieldSpec};

pub const FACTORS_TABLE: &str = "Factors Affecting Reserve Balances of Depository Institutions";
pub const STATEMENT_TABLE: &str = "Consolidated Statement of Condition of All Federal Reserve Banks";

pub const RESERVE_BANK_CREDIT: &str = "reserveBankCredit";
pub const SECURITIES_HELD: &str = "securitiesHeldOutright";
pub const TREASURY_SECURITIES: &str = "treasurySecurities";
pub const TREASURY_BILLS: &str = "treasuryBills";
pub const TREASURY_NOTES_BONDS: &str = "treasuryNotesAndBonds";
pub const TREASURY_INFLATION_INDEXED: &str = "treasuryInflationIndexed";
pub const AGENCY_DEBT: &str = "federalAgencyDebt";
pub const MORTGAGE_BACKED: &str = "mortgageBackedSecurities";
pub const REPURCHASE_AGREEMENTS: &str = "repurchaseAgreements";
pub const PRIMARY_CREDIT: &str = "primaryCredit";
pub const LIQUIDITY_SWAPS: &str = "centralBankLiquiditySwaps";
pub const TOTAL_SUPPLYING: &str = "totalFactorsSupplying";
pub const CURRENCY: &str = "currencyInCirculation";
pub const REVERSE_REPOS: &str = "reverseRepurchaseAgreements";
pub const FOREIGN_OFFICIAL_REVERSE_REPOS: &str = "foreignOfficialReverseRepos";
pub const TREASURY_GENERAL_ACCOUNT: &str = "treasuryGeneralAccount";
pub const TOTAL_ABSORBING: &str = "totalFactorsAbsorbing";
pub const RESERVE_BALANCES: &str = "reserveBalances";
pub const TOTAL_ASSETS: &str = "totalAssets";
pub const TOTAL_LIABILITIES: &str = "totalLiabilities";
pub const TOTAL_CAPITAL: &str = "totalCapital";
pub const FEDERAL_RESERVE_NOTES: &str = "federalReserveNotes";

/// Fields extracted when the caller supplies none, in resolution order.
///
/// The first entry's current column dates the edition, so it must be a
/// weekly-factors row present in every publication.
pub fn default_field_specs() -> Vec<FieldSpec> {
    use FieldMode::{Statement, WeeklyFactors};

    vec![
        FieldSpec::new(RESERVE_BANK_CREDIT, FACTORS_TABLE, WeeklyFactors, &["Reserve Bank credit"]),
        FieldSpec::new(SECURITIES_HELD, FACTORS_TABLE, WeeklyFactors, &["Securities held outright"]),
        FieldSpec::new(TREASURY_SECURITIES, FACTORS_TABLE, WeeklyFactors, &["U.S. Treasury securities"]),
        FieldSpec::new(TREASURY_BILLS, FACTORS_TABLE, WeeklyFactors, &["Bills"]),
        FieldSpec::new(
            TREASURY_NOTES_BONDS,
            FACTORS_TABLE,
            WeeklyFactors,
            &["Notes and bonds, nominal"],
        ),
        FieldSpec::new(
            TREASURY_INFLATION_INDEXED,
            FACTORS_TABLE,
            WeeklyFactors,
            &["Notes and bonds, inflation-indexed"],
        ),
        FieldSpec::new(AGENCY_DEBT, FACTORS_TABLE, WeeklyFactors, &["Federal agency debt securities"]),
        FieldSpec::new(MORTGAGE_BACKED, FACTORS_TABLE, WeeklyFactors, &["Mortgage-backed securities"]),
        FieldSpec::new(REPURCHASE_AGREEMENTS, FACTORS_TABLE, WeeklyFactors, &["Repurchase agreements"]),
        FieldSpec::new(PRIMARY_CREDIT, FACTORS_TABLE, WeeklyFactors, &["Primary credit"]),
        FieldSpec::new(LIQUIDITY_SWAPS, FACTORS_TABLE, WeeklyFactors, &["Central bank liquidity swaps"]),
        FieldSpec::new(
            TOTAL_SUPPLYING,
            FACTORS_TABLE,
            WeeklyFactors,
            &["Total factors supplying reserve funds"],
        ),
        FieldSpec::new(CURRENCY, FACTORS_TABLE, WeeklyFactors, &["Currency in circulation"]),
        FieldSpec::new(
            REVERSE_REPOS,
            FACTORS_TABLE,
            WeeklyFactors,
            &["Reverse repurchase agreements"],
        ),
        FieldSpec::new(
            FOREIGN_OFFICIAL_REVERSE_REPOS,
            FACTORS_TABLE,
            WeeklyFactors,
            &["Foreign official and international accounts"],
        ),
        FieldSpec::new(
            TREASURY_GENERAL_ACCOUNT,
            FACTORS_TABLE,
            WeeklyFactors,
            &["U.S. Treasury, General Account", "Treasury, General Account"],
        ),
        FieldSpec::new(
            TOTAL_ABSORBING,
            FACTORS_TABLE,
            WeeklyFactors,
            &[
                "Total factors, other than reserve balances, absorbing reserve funds",
                "Total factors absorbing reserve funds",
            ],
        ),
        FieldSpec::new(
            RESERVE_BALANCES,
            FACTORS_TABLE,
            WeeklyFactors,
            &["Reserve balances with Federal Reserve Banks"],
        ),
        FieldSpec::new(TOTAL_ASSETS, STATEMENT_TABLE, Statement, &["Total assets"]),
        FieldSpec::new(TOTAL_LIABILITIES, STATEMENT_TABLE, Statement, &["Total liabilities"]),
        FieldSpec::new(TOTAL_CAPITAL, STATEMENT_TABLE, Statement, &["Total capital"]),
        FieldSpec::new(
            FEDERAL_RESERVE_NOTES,
            STATEMENT_TABLE,
            Statement,
            &["Federal Reserve notes, net of F.R. Bank holdings", "Federal Reserve notes"],
        ),
    ]
}
