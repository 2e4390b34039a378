use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Country choice on a company profile, stored with the legacy wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "1")]
    Indian,
    #[serde(rename = "2")]
    Other,
}

impl Country {
    pub fn as_str(&self) -> &'static str {
        match self {
            Country::Indian => "1",
            Country::Other => "2",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1" => Some(Country::Indian),
            "2" => Some(Country::Other),
            _ => None,
        }
    }
}

impl std::str::FromStr for Country {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "indian" => Ok(Country::Indian),
            "2" | "other" => Ok(Country::Other),
            _ => Err(format!("unknown country '{}', expected 1/indian or 2/other", s)),
        }
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Country::Indian => "Indian",
            Country::Other => "Other",
        };
        write!(f, "{label}")
    }
}

/// Discriminant for the two advertisement (and offer) variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdKind {
    Job,
    Internship,
}

impl AdKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdKind::Job => "job",
            AdKind::Internship => "internship",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "job" => Some(AdKind::Job),
            "internship" => Some(AdKind::Internship),
            _ => None,
        }
    }
}

impl std::str::FromStr for AdKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdKind::parse(&s.to_lowercase())
            .ok_or_else(|| format!("unknown kind '{}', expected job or internship", s))
    }
}

impl std::fmt::Display for AdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
    pub username: Option<String>, // denormalized from user_accounts
    pub domain: String,
    pub url: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Country,
    pub pin_code: Option<String>,
    pub contact: String,
    pub registration_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyPerson {
    pub id: i64,
    pub name: String,
    pub company_id: i64,
    pub designation: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advertisement {
    pub id: Uuid,
    pub kind: AdKind,
    pub company_id: i64,
    pub company_name: Option<String>, // denormalized for convenience
    // validity
    pub expiry: Option<DateTime<Utc>>,
    pub active: bool,
    // role
    pub designation: String,
    pub description: String,
    pub tentative_join_date: NaiveDate,
    pub tentative_job_location: String,
    pub ad_file: Option<String>,
    // package
    pub ctc: f64,
    pub gross_salary: Option<f64>,
    pub bonus: Option<String>,
    pub bond: bool,
    pub bond_details: Option<String>,
    // selection process
    pub resume_required: bool,
    pub resume_shortlist_criteria: Option<String>,
    pub aptitude_test_required: bool,
    pub group_discussion_required: bool,
    pub number_of_technical_interviews: u32,
    pub number_of_technical_tests: u32,
    pub number_of_hr_rounds: u32,
    pub medical_test_required: bool,
    pub min_gpa: f64,
    pub number_of_members: Option<u32>,
    pub other_details: Option<String>,
    // notification
    pub email_sent: bool,
    pub creation_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: i64,
    pub kind: AdKind,
    pub student_id: Option<i64>,
    pub student_roll_no: Option<String>, // denormalized from students
    pub company_id: Option<i64>,
    pub company_name: Option<String>,
    pub advertisement_id: Uuid,
    pub designation: String, // from the advertisement
    pub ctc: f64,            // derived from the advertisement
    pub is_accepted: bool,
    pub ppo: bool,
    pub resume_id: Option<i64>,
    pub application_timestamp: DateTime<Utc>,
}

// --- Reference rows owned by out-of-scope collaborators ---
// Kept minimal: they exist so the deletion policies have real rows to act on.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub roll_no: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resume {
    pub id: i64,
    pub student_id: i64,
    pub file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramBranch {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramEmailId {
    pub id: i64,
    pub email: String,
}

// --- Input shapes ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    /// Login name for the linked user account, created with the profile.
    pub username: String,
    pub domain: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    pub country: Country,
    #[serde(default)]
    pub pin_code: Option<String>,
    pub contact: String,
}

/// Partial update for a company profile; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<Country>,
    #[serde(default)]
    pub pin_code: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCompanyPerson {
    pub company_id: i64,
    pub name: String,
    pub designation: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAdvertisement {
    pub company_id: i64,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active: bool,
    pub designation: String,
    pub description: String,
    pub tentative_join_date: NaiveDate,
    pub tentative_job_location: String,
    #[serde(default)]
    pub ad_file: Option<String>,
    pub ctc: f64,
    #[serde(default)]
    pub gross_salary: Option<f64>,
    #[serde(default)]
    pub bonus: Option<String>,
    pub bond: bool,
    #[serde(default)]
    pub bond_details: Option<String>,
    pub resume_required: bool,
    #[serde(default)]
    pub resume_shortlist_criteria: Option<String>,
    pub aptitude_test_required: bool,
    pub group_discussion_required: bool,
    #[serde(default)]
    pub number_of_technical_interviews: u32,
    #[serde(default)]
    pub number_of_technical_tests: u32,
    #[serde(default)]
    pub number_of_hr_rounds: u32,
    pub medical_test_required: bool,
    pub min_gpa: f64,
    #[serde(default)]
    pub number_of_members: Option<u32>,
    #[serde(default)]
    pub other_details: Option<String>,
    /// Eligible program branches; `None` means every existing branch.
    #[serde(default)]
    pub eligible_program_branch: Option<Vec<i64>>,
    /// Notification email ids to attach; may be empty.
    #[serde(default)]
    pub email_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOffer {
    #[serde(default)]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub company_id: Option<i64>,
    pub advertisement_id: Uuid,
    #[serde(default)]
    pub is_accepted: bool,
    #[serde(default)]
    pub ppo: bool,
    #[serde(default)]
    pub resume_id: Option<i64>,
}
