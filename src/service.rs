//! Write-path layer: every mutation goes validate -> mutate -> store, with
//! the post-delete cleanup called explicitly instead of hanging off signals.

use chrono::Utc;
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{
    AdKind, Advertisement, CompanyProfile, CompanyUpdate, NewAdvertisement, NewCompany,
    NewCompanyPerson, NewOffer, Offer,
};

/// Offer pre-save rule: a pre-placement offer is accepted by policy,
/// whatever the submitted flag said.
pub fn apply_offer_policy(offer: &mut NewOffer) {
    if offer.ppo && !offer.is_accepted {
        offer.is_accepted = true;
    }
}

pub fn register_company(db: &Database, new: &NewCompany) -> Result<CompanyProfile> {
    validate_company_fields(
        &new.name,
        &new.domain,
        new.url.as_deref(),
        new.city.as_deref(),
        new.state.as_deref(),
        new.pin_code.as_deref(),
        &new.contact,
    )?;
    require("username", &new.username, 150)?;

    let company_id = db.register_company(new, Utc::now())?;
    tracing::info!(company_id, name = %new.name, "registered company");
    db.get_company(company_id)?.ok_or(Error::NotFound {
        entity: "company",
    })
}

pub fn update_company(db: &Database, id: i64, update: &CompanyUpdate) -> Result<CompanyProfile> {
    let mut company = db.get_company(id)?.ok_or(Error::NotFound {
        entity: "company",
    })?;

    if let Some(name) = &update.name {
        company.name = name.clone();
    }
    if let Some(domain) = &update.domain {
        company.domain = domain.clone();
    }
    if let Some(url) = &update.url {
        company.url = Some(url.clone());
    }
    if let Some(city) = &update.city {
        company.city = Some(city.clone());
    }
    if let Some(state) = &update.state {
        company.state = Some(state.clone());
    }
    if let Some(country) = update.country {
        company.country = country;
    }
    if let Some(pin_code) = &update.pin_code {
        company.pin_code = Some(pin_code.clone());
    }
    if let Some(contact) = &update.contact {
        company.contact = contact.clone();
    }

    validate_company_fields(
        &company.name,
        &company.domain,
        company.url.as_deref(),
        company.city.as_deref(),
        company.state.as_deref(),
        company.pin_code.as_deref(),
        &company.contact,
    )?;

    db.update_company(&company)?;
    tracing::info!(company_id = id, "updated company profile");
    Ok(company)
}

/// Delete the profile, then run the post-delete cleanup: the linked user
/// account goes too, and an already-missing account is not an error.
pub fn delete_company(db: &Database, id: i64) -> Result<()> {
    let company = db.get_company(id)?.ok_or(Error::NotFound {
        entity: "company",
    })?;
    db.delete_company(id)?;
    cleanup_user_account(db, company.user_id)?;
    tracing::info!(company_id = id, "deleted company profile");
    Ok(())
}

fn cleanup_user_account(db: &Database, user_id: i64) -> Result<()> {
    if !db.delete_user_account(user_id)? {
        tracing::debug!(user_id, "linked user account already gone");
    }
    Ok(())
}

pub fn add_company_person(db: &Database, new: &NewCompanyPerson) -> Result<i64> {
    require("name", &new.name, 30)?;
    require("designation", &new.designation, 30)?;
    require("phone", &new.phone, 15)?;
    if !looks_like_email(&new.email) {
        return Err(Error::invalid("email", "not a valid email address"));
    }
    if db.get_company(new.company_id)?.is_none() {
        return Err(Error::NotFound { entity: "company" });
    }
    db.add_company_person(new)
}

pub fn create_advertisement(
    db: &Database,
    kind: AdKind,
    new: &NewAdvertisement,
) -> Result<Advertisement> {
    require("designation", &new.designation, 250)?;
    if new.description.trim().is_empty() {
        return Err(Error::invalid("description", "must not be empty"));
    }
    require("tentative_job_location", &new.tentative_job_location, 50)?;
    bounded("bonus", new.bonus.as_deref(), 100)?;
    if !new.ctc.is_finite() || new.ctc < 0.0 {
        return Err(Error::invalid("ctc", "must be a non-negative number"));
    }
    if !new.min_gpa.is_finite() || new.min_gpa < 0.0 {
        return Err(Error::invalid("min_gpa", "must be a non-negative number"));
    }
    if db.get_company(new.company_id)?.is_none() {
        return Err(Error::NotFound { entity: "company" });
    }

    let id = Uuid::new_v4();
    db.create_advertisement(id, kind, new, Utc::now())?;
    tracing::info!(advertisement_id = %id, kind = kind.as_str(), "created advertisement");
    db.get_advertisement(id)?.ok_or(Error::NotFound {
        entity: "advertisement",
    })
}

pub fn create_offer(db: &Database, kind: AdKind, new: &NewOffer) -> Result<Offer> {
    let ad = db
        .get_advertisement(new.advertisement_id)?
        .ok_or(Error::NotFound {
            entity: "advertisement",
        })?;
    if ad.kind != kind {
        return Err(Error::invalid(
            "advertisement_id",
            format!(
                "advertisement is a {} posting, not {}",
                ad.kind.as_str(),
                kind.as_str()
            ),
        ));
    }
    if let Some(student_id) = new.student_id {
        if db.get_student(student_id)?.is_none() {
            return Err(Error::NotFound { entity: "student" });
        }
    }
    if let Some(company_id) = new.company_id {
        if db.get_company(company_id)?.is_none() {
            return Err(Error::NotFound { entity: "company" });
        }
    }
    if let Some(resume_id) = new.resume_id {
        if db.get_resume(resume_id)?.is_none() {
            return Err(Error::NotFound { entity: "resume" });
        }
    }

    let mut prepared = new.clone();
    apply_offer_policy(&mut prepared);

    let offer_id = db.insert_offer(kind, &prepared, Utc::now())?;
    tracing::info!(offer_id, kind = kind.as_str(), ppo = prepared.ppo, "created offer");
    db.get_offer(offer_id)?.ok_or(Error::NotFound { entity: "offer" })
}

// --- Field checks ---

fn require(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid(field, "must not be empty"));
    }
    if value.len() > max {
        return Err(Error::invalid(field, format!("longer than {max} characters")));
    }
    Ok(())
}

fn bounded(field: &'static str, value: Option<&str>, max: usize) -> Result<()> {
    if let Some(v) = value {
        if v.len() > max {
            return Err(Error::invalid(field, format!("longer than {max} characters")));
        }
    }
    Ok(())
}

fn validate_company_fields(
    name: &str,
    domain: &str,
    url: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
    pin_code: Option<&str>,
    contact: &str,
) -> Result<()> {
    require("name", name, 50)?;
    require("domain", domain, 30)?;
    bounded("url", url, 100)?;
    bounded("city", city, 15)?;
    bounded("state", state, 15)?;
    bounded("pin_code", pin_code, 10)?;
    require("contact", contact, 20)?;
    Ok(())
}

fn looks_like_email(value: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    });
    re.is_match(value)
}
