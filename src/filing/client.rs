use super::dates::{format_uk_date, parse_date, AccountingReferenceDate};
use super::deadlines::{DeadlineInputs, Deadlines, DueSource};
use super::lenient;
use super::warnings::Warning;
use chrono::NaiveDate;
use filingc_derive::Columns;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Input root for client JSON
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientInput {
    pub clients: Vec<ClientRecord>,
}

/// A client row as stored or exported. Dates are kept as text and read
/// leniently: anything unreadable counts as not set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, Columns)]
pub struct ClientRecord {
    /// Practice client code
    pub code: String,
    /// Companies House company number
    #[serde(default)]
    pub company_number: Option<String>,
    /// Client or company name
    #[serde(default)]
    pub name: Option<String>,
    /// Accounting reference day of month (1-31)
    #[serde(default, deserialize_with = "lenient::text")]
    pub ard_day: Option<String>,
    /// Accounting reference month (1-12)
    #[serde(default, deserialize_with = "lenient::text")]
    pub ard_month: Option<String>,
    /// Period end of the last filed accounts
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_accounts_made_up_to: Option<String>,
    /// Date of incorporation
    #[serde(default, deserialize_with = "lenient::text")]
    pub incorporation_date: Option<String>,
    /// Made-up date of the last confirmation statement
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_confirmation_made_up_to: Option<String>,
    /// Manually entered corporation tax due date, overrides the calculation
    #[serde(default, deserialize_with = "lenient::text")]
    pub ct_due_override: Option<String>,
    /// Cached next year-end
    #[serde(default, deserialize_with = "lenient::text")]
    pub next_year_end: Option<String>,
    /// Cached accounts filing deadline
    #[serde(default, deserialize_with = "lenient::text")]
    pub next_accounts_due: Option<String>,
    /// Cached corporation tax (CT600) deadline
    #[serde(default, deserialize_with = "lenient::text")]
    pub next_corporation_tax_due: Option<String>,
    /// Cached confirmation statement deadline
    #[serde(default, deserialize_with = "lenient::text")]
    pub next_confirmation_due: Option<String>,
}

/// The cached due-date columns of a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CachedField {
    NextYearEnd,
    NextAccountsDue,
    NextCorporationTaxDue,
    NextConfirmationDue,
}

impl CachedField {
    pub const ALL: [CachedField; 4] = [
        CachedField::NextYearEnd,
        CachedField::NextAccountsDue,
        CachedField::NextCorporationTaxDue,
        CachedField::NextConfirmationDue,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            CachedField::NextYearEnd => "next_year_end",
            CachedField::NextAccountsDue => "next_accounts_due",
            CachedField::NextCorporationTaxDue => "next_corporation_tax_due",
            CachedField::NextConfirmationDue => "next_confirmation_due",
        }
    }
}

impl fmt::Display for CachedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// A cached due date that no longer matches its source dates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drift {
    pub field: CachedField,
    pub cached: Option<NaiveDate>,
    pub derived: Option<NaiveDate>,
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is {} but should be {}",
            self.field,
            format_uk_date(self.cached),
            format_uk_date(self.derived)
        )
    }
}

/// A client with its source and cached dates read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Client {
    pub code: String,
    pub company_number: Option<String>,
    pub name: Option<String>,
    pub inputs: DeadlineInputs,
    pub ct_due_override: Option<NaiveDate>,
    pub next_year_end: Option<NaiveDate>,
    pub next_accounts_due: Option<NaiveDate>,
    pub next_corporation_tax_due: Option<NaiveDate>,
    pub next_confirmation_due: Option<NaiveDate>,
}

impl Client {
    /// Read a record, collecting a warning for every value that had to be ignored
    pub fn from_record(record: &ClientRecord) -> (Client, Vec<Warning>) {
        let mut warnings = Vec::new();
        let mut date = |field: &str, raw: &Option<String>| -> Option<NaiveDate> {
            let raw = raw.as_deref()?;
            let parsed = parse_date(raw);
            if parsed.is_none() {
                log::warn!("Client {}: unparseable {} '{}'", record.code, field, raw);
                warnings.push(Warning::UnparseableDate {
                    field: field.to_string(),
                    value: raw.to_string(),
                });
            }
            parsed
        };

        let inputs = DeadlineInputs {
            accounting_reference_date: None,
            last_accounts_made_up_to: date("last_accounts_made_up_to", &record.last_accounts_made_up_to),
            incorporation_date: date("incorporation_date", &record.incorporation_date),
            last_confirmation_made_up_to: date(
                "last_confirmation_made_up_to",
                &record.last_confirmation_made_up_to,
            ),
        };
        let ct_due_override = date("ct_due_override", &record.ct_due_override);
        let next_year_end = date("next_year_end", &record.next_year_end);
        let next_accounts_due = date("next_accounts_due", &record.next_accounts_due);
        let next_corporation_tax_due = date("next_corporation_tax_due", &record.next_corporation_tax_due);
        let next_confirmation_due = date("next_confirmation_due", &record.next_confirmation_due);

        let accounting_reference_date = match (&record.ard_day, &record.ard_month) {
            (Some(day), Some(month)) => {
                let ard = AccountingReferenceDate::parse(day, month);
                if ard.is_none() {
                    log::warn!("Client {}: invalid reference date {}/{}", record.code, day, month);
                    warnings.push(Warning::InvalidReferenceDate {
                        day: day.clone(),
                        month: month.clone(),
                    });
                }
                ard
            }
            _ => None,
        };

        let client = Client {
            code: record.code.clone(),
            company_number: record.company_number.clone(),
            name: record.name.clone(),
            inputs: DeadlineInputs {
                accounting_reference_date,
                ..inputs
            },
            ct_due_override,
            next_year_end,
            next_accounts_due,
            next_corporation_tax_due,
            next_confirmation_due,
        };
        (client, warnings)
    }

    pub fn deadlines(&self, today: NaiveDate) -> Deadlines {
        Deadlines::calculate(&self.inputs, self.ct_due_override, today)
    }

    pub fn cached(&self, field: CachedField) -> Option<NaiveDate> {
        match field {
            CachedField::NextYearEnd => self.next_year_end,
            CachedField::NextAccountsDue => self.next_accounts_due,
            CachedField::NextCorporationTaxDue => self.next_corporation_tax_due,
            CachedField::NextConfirmationDue => self.next_confirmation_due,
        }
    }

    /// Cached fields that differ from what the source dates give today.
    ///
    /// A manual CT override is itself the expected cached value.
    pub fn drift(&self, today: NaiveDate) -> Vec<Drift> {
        let deadlines = self.deadlines(today);
        CachedField::ALL
            .into_iter()
            .filter_map(|field| {
                let derived = derived(&deadlines, field);
                let cached = self.cached(field);
                (cached != derived).then_some(Drift {
                    field,
                    cached,
                    derived,
                })
            })
            .collect()
    }

    /// Recompute every cached field from the source dates
    pub fn refresh(&mut self, today: NaiveDate) {
        let deadlines = self.deadlines(today);
        self.next_year_end = deadlines.year_end;
        self.next_accounts_due = deadlines.accounts_due;
        self.next_corporation_tax_due = deadlines.corporation_tax_due.date;
        self.next_confirmation_due = deadlines.confirmation_due;
        if deadlines.corporation_tax_due.source == DueSource::Manual {
            log::debug!("Client {}: keeping manual CT due date", self.code);
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.code)
    }
}

fn derived(deadlines: &Deadlines, field: CachedField) -> Option<NaiveDate> {
    match field {
        CachedField::NextYearEnd => deadlines.year_end,
        CachedField::NextAccountsDue => deadlines.accounts_due,
        CachedField::NextCorporationTaxDue => deadlines.corporation_tax_due.date,
        CachedField::NextConfirmationDue => deadlines.confirmation_due,
    }
}

impl From<&Client> for ClientRecord {
    fn from(client: &Client) -> Self {
        let iso = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string());
        let ard = client.inputs.accounting_reference_date;
        ClientRecord {
            code: client.code.clone(),
            company_number: client.company_number.clone(),
            name: client.name.clone(),
            ard_day: ard.map(|a| a.day.to_string()),
            ard_month: ard.map(|a| a.month.to_string()),
            last_accounts_made_up_to: iso(client.inputs.last_accounts_made_up_to),
            incorporation_date: iso(client.inputs.incorporation_date),
            last_confirmation_made_up_to: iso(client.inputs.last_confirmation_made_up_to),
            ct_due_override: iso(client.ct_due_override),
            next_year_end: iso(client.next_year_end),
            next_accounts_due: iso(client.next_accounts_due),
            next_corporation_tax_due: iso(client.next_corporation_tax_due),
            next_confirmation_due: iso(client.next_confirmation_due),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filing::deadlines::DueDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn record(code: &str) -> ClientRecord {
        ClientRecord {
            code: code.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn reads_companies_house_style_record() {
        let json = r#"{
            "code": "ACME01",
            "company_number": "01234567",
            "ard_day": "31",
            "ard_month": "03",
            "incorporation_date": "2010-04-01T00:00:00.000Z"
        }"#;
        let rec: ClientRecord = serde_json::from_str(json).unwrap();
        let (client, warnings) = Client::from_record(&rec);
        assert!(warnings.is_empty());
        assert_eq!(client.company_number.as_deref(), Some("01234567"));
        assert_eq!(
            client.inputs.accounting_reference_date,
            AccountingReferenceDate::new(31, 3)
        );
        assert_eq!(client.inputs.incorporation_date, Some(d(2010, 4, 1)));
    }

    #[test]
    fn bad_values_become_warnings_not_errors() {
        let rec = ClientRecord {
            ard_day: Some("30".to_string()),
            ard_month: Some("2".to_string()),
            last_accounts_made_up_to: Some("last spring".to_string()),
            ..record("BAD01")
        };
        let (client, warnings) = Client::from_record(&rec);
        assert_eq!(client.inputs, DeadlineInputs::default());
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].kind(), "UnparseableDate");
        assert_eq!(warnings[1].kind(), "InvalidReferenceDate");

        let deadlines = client.deadlines(d(2024, 6, 1));
        assert_eq!(deadlines.year_end, None);
        assert_eq!(deadlines.corporation_tax_due.date, None);
    }

    #[test]
    fn unreadable_last_accounts_fall_back_to_reference_date() {
        let rec = ClientRecord {
            ard_day: Some("31".to_string()),
            ard_month: Some("03".to_string()),
            last_accounts_made_up_to: Some("last spring".to_string()),
            ..record("FALLBACK01")
        };
        let (client, warnings) = Client::from_record(&rec);
        assert_eq!(
            warnings,
            vec![Warning::UnparseableDate {
                field: "last_accounts_made_up_to".to_string(),
                value: "last spring".to_string(),
            }]
        );
        assert_eq!(client.inputs.last_accounts_made_up_to, None);

        let deadlines = client.deadlines(d(2024, 6, 1));
        assert_eq!(deadlines.year_end, Some(d(2025, 3, 31)));
        assert_eq!(deadlines.corporation_tax_due, DueDate::auto(Some(d(2026, 3, 31))));
    }

    #[test]
    fn refreshed_client_has_no_drift() {
        let rec = ClientRecord {
            ard_day: Some("31".to_string()),
            ard_month: Some("12".to_string()),
            incorporation_date: Some("2019-07-09".to_string()),
            next_year_end: Some("2023-12-31".to_string()),
            ..record("DRIFT01")
        };
        let (mut client, _) = Client::from_record(&rec);
        let today = d(2024, 6, 1);

        let drift = client.drift(today);
        assert_eq!(drift.len(), 4);
        assert_eq!(drift[0].field, CachedField::NextYearEnd);
        assert_eq!(drift[0].cached, Some(d(2023, 12, 31)));
        assert_eq!(drift[0].derived, Some(d(2024, 12, 31)));
        assert_eq!(
            drift[0].to_string(),
            "next_year_end is 31/12/2023 but should be 31/12/2024"
        );

        client.refresh(today);
        assert!(client.drift(today).is_empty());
        assert_eq!(client.next_corporation_tax_due, Some(d(2025, 12, 31)));
        assert_eq!(client.next_confirmation_due, Some(d(2024, 7, 23)));
    }

    #[test]
    fn manual_override_is_not_drift() {
        let rec = ClientRecord {
            ard_day: Some("31".to_string()),
            ard_month: Some("3".to_string()),
            ct_due_override: Some("2026-01-15".to_string()),
            next_corporation_tax_due: Some("2026-01-15".to_string()),
            ..record("MAN01")
        };
        let (client, _) = Client::from_record(&rec);
        let drift = client.drift(d(2024, 6, 1));
        assert!(drift.iter().all(|d| d.field != CachedField::NextCorporationTaxDue));
    }

    #[test]
    fn record_round_trip_keeps_dates() {
        let rec = ClientRecord {
            ard_day: Some("5".to_string()),
            ard_month: Some("4".to_string()),
            incorporation_date: Some("05/04/2012".to_string()),
            ..record("RT01")
        };
        let (client, _) = Client::from_record(&rec);
        let out = ClientRecord::from(&client);
        assert_eq!(out.ard_day.as_deref(), Some("5"));
        assert_eq!(out.ard_month.as_deref(), Some("4"));
        assert_eq!(out.incorporation_date.as_deref(), Some("2012-04-05"));
        assert_eq!(client.display_name(), "RT01");
    }

    #[test]
    fn columns_describe_csv_layout() {
        let columns = ClientRecord::columns();
        assert_eq!(columns[0].name, "code");
        assert!(columns[0].required);
        assert_eq!(columns[0].description, "Practice client code");
        assert!(columns.iter().skip(1).all(|c| !c.required));
        assert_eq!(columns.len(), 13);
    }
}
