/// Version of the alias table below. Bump it whenever a backend generation
/// is added or an alias is removed, so callers caching normalized rows can
/// tell the mapping changed.
pub const ALIAS_TABLE_VERSION: u16 = 2;

/// A business field as the core understands it, independent of how a given
/// backend generation names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalField {
    // ── Investment ──────────────────────────────────────────────────
    ProductName,
    ProviderName,
    MonthlyContribution,
    OneTimePayment,
    NetPaidIn,
    CurrentValue,
    ReturnPercent,
    StartDate,
    CustomerEmail,

    // ── Portfolio snapshot ──────────────────────────────────────────
    SnapshotDate,
    SnapshotValue,
    SnapshotPaidIn,
    SnapshotReturn,

    // ── ETF allocation ──────────────────────────────────────────────
    EtfIsin,
    EtfName,
    EtfWeight,

    // ── Policy (function backend) ───────────────────────────────────
    PolicyId,
    PolicyCustomerId,
    PolicyCategory,
    ContractNumber,
    PerformanceHistory,
    EtfAllocations,
    HistoryDate,
    HistoryValue,

    // ── Document ────────────────────────────────────────────────────
    DocumentId,
    DocumentCustomerId,
    DocumentTitle,
    DocumentUrl,
    DocumentCategory,
    DocumentDate,
    DocumentPolicyId,

    // ── Customer profile ────────────────────────────────────────────
    CustomerId,
    CustomerName,
    CustomerPhone,
    AvatarUrl,
    Language,
    CreatedAt,
    BirthDate,
    PostalCode,
    Occupation,
    UserType,
}

impl LogicalField {
    /// Known key names for this field, in lookup priority order.
    ///
    /// The first entry is the Postgres column name where one exists; camelCase
    /// aliases are also matched in snake_case by `resolve_field`.
    #[must_use]
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            LogicalField::ProductName => &["produkt", "produktname", "productName", "product"],
            LogicalField::ProviderName => &["versicherer", "anbieter", "providerName", "provider"],
            LogicalField::MonthlyContribution => {
                &["monatsbeitrag", "monthlyContribution", "sparrate", "beitrag"]
            }
            LogicalField::OneTimePayment => &["einmalzahlung", "oneTimePayment", "einmalbetrag"],
            LogicalField::NetPaidIn => &["eingezahlt_netto", "netPaidIn", "eingezahlt", "totalPaidIn"],
            LogicalField::CurrentValue => &[
                "depotwert",
                "portfolio_wert",
                "portfolioValue",
                "currentValue",
                "marketValue",
                "nav",
                "accountBalance",
                "rueckkaufswert",
            ],
            LogicalField::ReturnPercent => &["rendite", "rendite_prozent", "returnPercent"],
            LogicalField::StartDate => {
                &["startdatum", "vertragsbeginn", "startDate", "contractStart"]
            }
            LogicalField::CustomerEmail => &["kunde_email", "customerEmail", "email"],

            LogicalField::SnapshotDate => &["datum", "date", "snapshotDate"],
            LogicalField::SnapshotValue => {
                &["portfolio_wert", "depotwert", "portfolioValue", "value"]
            }
            LogicalField::SnapshotPaidIn => {
                &["eingezahlt_bis_dahin", "paidInToDate", "eingezahlt", "investedValue"]
            }
            LogicalField::SnapshotReturn => &["rendite_prozent", "rendite", "returnPercent"],

            LogicalField::EtfIsin => &["isin"],
            LogicalField::EtfName => &["name", "fondsname", "fundName"],
            LogicalField::EtfWeight => &["prozent", "percentage", "anteil", "weight"],

            LogicalField::PolicyId => &["id", "policyId"],
            LogicalField::PolicyCustomerId => &["userId", "kunde_id"],
            LogicalField::PolicyCategory => &["kategorie", "category"],
            LogicalField::ContractNumber => &["vertragsnummer", "contractNumber"],
            LogicalField::PerformanceHistory => &["performanceHistorie", "performanceHistory"],
            LogicalField::EtfAllocations => &["etfAllokation", "etfAllocation", "etfs"],
            LogicalField::HistoryDate => &["date", "datum"],
            LogicalField::HistoryValue => &["value", "wert"],

            LogicalField::DocumentId => &["id"],
            LogicalField::DocumentCustomerId => &["userId", "user_id"],
            LogicalField::DocumentTitle => &["titel", "title"],
            LogicalField::DocumentUrl => &["url", "fileUrl"],
            LogicalField::DocumentCategory => &["kategorie", "category"],
            LogicalField::DocumentDate => &["datum", "createdAt"],
            LogicalField::DocumentPolicyId => &["policyId", "policy_id"],

            LogicalField::CustomerId => &["id", "userId"],
            LogicalField::CustomerName => &["name", "fullName"],
            LogicalField::CustomerPhone => &["phone", "telefon"],
            LogicalField::AvatarUrl => &["avatarUrl"],
            LogicalField::Language => &["language", "sprache"],
            LogicalField::CreatedAt => &["createdAt"],
            LogicalField::BirthDate => &["geburtsdatum", "birthDate"],
            LogicalField::PostalCode => &["postleitzahl", "postalCode"],
            LogicalField::Occupation => &["beruf", "occupation"],
            LogicalField::UserType => &["userType"],
        }
    }
}
