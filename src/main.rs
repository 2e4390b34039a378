mod db;
mod error;
mod models;
mod routes;
mod service;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use db::Database;
use models::{AdKind, Country, NewAdvertisement, NewCompany, NewCompanyPerson, NewOffer};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "placement")]
#[command(about = "Campus placement backend - companies, advertisements, offers")]
struct Cli {
    /// Path to the SQLite database (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Run the HTTP backend
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(long, default_value = "8000")]
        port: u16,
    },

    /// Manage company profiles
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },

    /// Manage job/internship advertisements
    Ad {
        #[command(subcommand)]
        command: AdCommands,
    },

    /// Manage offers extended to students
    Offer {
        #[command(subcommand)]
        command: OfferCommands,
    },

    /// Manage reference rows (students, resumes, program data)
    Refs {
        #[command(subcommand)]
        command: RefsCommands,
    },
}

#[derive(Subcommand)]
enum CompanyCommands {
    /// Register a company and its linked user account
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        /// Login name for the linked user account
        #[arg(long)]
        username: String,

        /// Business domain, e.g. software, finance
        #[arg(long)]
        domain: String,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        state: Option<String>,

        /// indian or other
        #[arg(long)]
        country: Country,

        #[arg(long)]
        pin_code: Option<String>,

        /// Contact phone number
        #[arg(long)]
        contact: String,
    },

    /// List all companies
    List,

    /// Show company details
    Show {
        /// Company name or ID
        name: String,
    },

    /// Delete a company (advertisements cascade, offers keep a null company)
    Delete {
        /// Company ID
        id: i64,
    },

    /// Add a contact person to a company
    AddPerson {
        #[arg(long)]
        company: i64,

        #[arg(long)]
        name: String,

        #[arg(long)]
        designation: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        email: String,
    },

    /// List a company's contact persons
    Persons {
        /// Company ID
        company: i64,
    },
}

#[derive(Subcommand)]
enum AdCommands {
    /// Create an advertisement
    Add {
        /// job or internship
        #[arg(long)]
        kind: AdKind,

        /// Owning company ID
        #[arg(long)]
        company: i64,

        #[arg(long)]
        designation: String,

        #[arg(long)]
        description: String,

        /// Tentative joining date, YYYY-MM-DD
        #[arg(long)]
        join_date: NaiveDate,

        #[arg(long)]
        location: String,

        /// Cost to company, lakhs per annum
        #[arg(long)]
        ctc: f64,

        #[arg(long)]
        gross_salary: Option<f64>,

        #[arg(long)]
        bonus: Option<String>,

        #[arg(long)]
        bond: bool,

        #[arg(long)]
        bond_details: Option<String>,

        #[arg(long)]
        resume_required: bool,

        #[arg(long)]
        aptitude_test: bool,

        #[arg(long)]
        group_discussion: bool,

        #[arg(long)]
        medical_test: bool,

        #[arg(long)]
        min_gpa: f64,

        #[arg(long, default_value = "0")]
        interviews: u32,

        #[arg(long, default_value = "0")]
        tests: u32,

        #[arg(long, default_value = "0")]
        hr_rounds: u32,

        #[arg(long)]
        members: Option<u32>,

        #[arg(long)]
        active: bool,

        /// Eligible program branch IDs; omit for all branches
        #[arg(long)]
        branch: Vec<i64>,

        /// Notification email IDs to attach
        #[arg(long)]
        email_id: Vec<i64>,
    },

    /// List advertisements
    List {
        /// Filter by kind (job, internship)
        #[arg(short, long)]
        kind: Option<AdKind>,

        /// Filter by company ID
        #[arg(short, long)]
        company: Option<i64>,
    },

    /// Show advertisement details
    Show {
        /// Advertisement UUID
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum OfferCommands {
    /// Extend an offer to a student
    Add {
        /// job or internship; must match the advertisement
        #[arg(long)]
        kind: AdKind,

        /// Advertisement UUID
        #[arg(long)]
        ad: Uuid,

        #[arg(long)]
        student: Option<i64>,

        #[arg(long)]
        company: Option<i64>,

        #[arg(long)]
        resume: Option<i64>,

        /// Pre-placement offer (accepted by policy)
        #[arg(long)]
        ppo: bool,

        #[arg(long)]
        accepted: bool,
    },

    /// List offers of one kind
    List {
        /// job or internship
        #[arg(short, long)]
        kind: AdKind,

        /// Filter by company ID
        #[arg(short, long)]
        company: Option<i64>,
    },
}

#[derive(Subcommand)]
enum RefsCommands {
    /// Add a student record
    AddStudent {
        roll_no: String,
        name: String,
    },

    /// List students
    Students,

    /// Remove a student (their offers cascade away)
    RemoveStudent {
        id: i64,
    },

    /// Register a resume document for a student
    AddResume {
        student: i64,
        file_path: String,
    },

    /// List resumes
    Resumes,

    /// Remove a resume (rejected while an offer references it)
    RemoveResume {
        id: i64,
    },

    /// Add a program branch
    AddBranch {
        name: String,
    },

    /// List program branches
    Branches,

    /// Add a notification email id
    AddEmail {
        email: String,
    },

    /// List notification email ids
    Emails,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let db = match &cli.db {
        Some(path) => Database::open_at(path)?,
        None => Database::open()?,
    };

    match cli.command {
        Commands::Init => {
            db.init()?;
            println!("Database initialized at {}", db.path().display());
        }

        Commands::Serve { host, port } => {
            db.ensure_initialized()?;
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("placement=info")),
                )
                .init();
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(routes::serve(db, &host, port))?;
        }

        Commands::Company { command } => {
            db.ensure_initialized()?;
            run_company_command(&db, command)?;
        }

        Commands::Ad { command } => {
            db.ensure_initialized()?;
            run_ad_command(&db, command)?;
        }

        Commands::Offer { command } => {
            db.ensure_initialized()?;
            run_offer_command(&db, command)?;
        }

        Commands::Refs { command } => {
            db.ensure_initialized()?;
            run_refs_command(&db, command)?;
        }
    }

    Ok(())
}

fn run_company_command(db: &Database, command: CompanyCommands) -> Result<()> {
    match command {
        CompanyCommands::Add {
            name,
            username,
            domain,
            url,
            city,
            state,
            country,
            pin_code,
            contact,
        } => {
            let company = service::register_company(
                db,
                &NewCompany {
                    name,
                    username,
                    domain,
                    url,
                    city,
                    state,
                    country,
                    pin_code,
                    contact,
                },
            )?;
            println!("Registered company '{}' (ID: {})", company.name, company.id);
        }

        CompanyCommands::List => {
            let companies = db.list_companies()?;
            if companies.is_empty() {
                println!("No companies found.");
            } else {
                println!(
                    "{:<6} {:<25} {:<15} {:<8} {:<15}",
                    "ID", "NAME", "DOMAIN", "COUNTRY", "USERNAME"
                );
                println!("{}", "-".repeat(73));
                for company in companies {
                    println!(
                        "{:<6} {:<25} {:<15} {:<8} {:<15}",
                        company.id,
                        truncate(&company.name, 23),
                        truncate(&company.domain, 13),
                        company.country,
                        truncate(&company.username.unwrap_or_default(), 13)
                    );
                }
            }
        }

        CompanyCommands::Show { name } => {
            let company = if let Ok(id) = name.parse::<i64>() {
                db.get_company(id)?
            } else {
                db.get_company_by_name(&name)?
            };

            match company {
                Some(company) => {
                    println!("Company #{}", company.id);
                    println!("Name: {}", company.name);
                    println!("Domain: {}", company.domain);
                    println!("Country: {}", company.country);
                    if let Some(url) = &company.url {
                        println!("URL: {}", url);
                    }
                    if let Some(city) = &company.city {
                        println!("City: {}", city);
                    }
                    if let Some(state) = &company.state {
                        println!("State: {}", state);
                    }
                    if let Some(pin_code) = &company.pin_code {
                        println!("PIN: {}", pin_code);
                    }
                    println!("Contact: {}", company.contact);
                    if let Some(username) = &company.username {
                        println!("Account: {}", username);
                    }
                    println!("Registered: {}", company.registration_timestamp);

                    let ads = db.list_advertisements(None, Some(company.id))?;
                    if !ads.is_empty() {
                        println!("\nAdvertisements ({}):", ads.len());
                        for ad in ads {
                            println!(
                                "  {} - {} ({}, CTC {})",
                                short_id(&ad.id),
                                ad.designation,
                                ad.kind,
                                ad.ctc
                            );
                        }
                    }
                }
                None => {
                    println!("Company '{}' not found.", name);
                }
            }
        }

        CompanyCommands::Delete { id } => {
            service::delete_company(db, id)?;
            println!("Deleted company #{} and its linked user account.", id);
        }

        CompanyCommands::AddPerson {
            company,
            name,
            designation,
            phone,
            email,
        } => {
            let person_id = service::add_company_person(
                db,
                &NewCompanyPerson {
                    company_id: company,
                    name,
                    designation,
                    phone,
                    email,
                },
            )?;
            println!("Added contact person (ID: {})", person_id);
        }

        CompanyCommands::Persons { company } => {
            let persons = db.list_company_persons(company)?;
            if persons.is_empty() {
                println!("No contact persons found.");
            } else {
                println!(
                    "{:<6} {:<20} {:<20} {:<15} {:<25}",
                    "ID", "NAME", "DESIGNATION", "PHONE", "EMAIL"
                );
                println!("{}", "-".repeat(88));
                for person in persons {
                    println!(
                        "{:<6} {:<20} {:<20} {:<15} {:<25}",
                        person.id,
                        truncate(&person.name, 18),
                        truncate(&person.designation, 18),
                        truncate(&person.phone, 13),
                        truncate(&person.email, 23)
                    );
                }
            }
        }
    }
    Ok(())
}

fn run_ad_command(db: &Database, command: AdCommands) -> Result<()> {
    match command {
        AdCommands::Add {
            kind,
            company,
            designation,
            description,
            join_date,
            location,
            ctc,
            gross_salary,
            bonus,
            bond,
            bond_details,
            resume_required,
            aptitude_test,
            group_discussion,
            medical_test,
            min_gpa,
            interviews,
            tests,
            hr_rounds,
            members,
            active,
            branch,
            email_id,
        } => {
            let ad = service::create_advertisement(
                db,
                kind,
                &NewAdvertisement {
                    company_id: company,
                    expiry: None,
                    active,
                    designation,
                    description,
                    tentative_join_date: join_date,
                    tentative_job_location: location,
                    ad_file: None,
                    ctc,
                    gross_salary,
                    bonus,
                    bond,
                    bond_details,
                    resume_required,
                    resume_shortlist_criteria: None,
                    aptitude_test_required: aptitude_test,
                    group_discussion_required: group_discussion,
                    number_of_technical_interviews: interviews,
                    number_of_technical_tests: tests,
                    number_of_hr_rounds: hr_rounds,
                    medical_test_required: medical_test,
                    min_gpa,
                    number_of_members: members,
                    other_details: None,
                    eligible_program_branch: if branch.is_empty() {
                        None
                    } else {
                        Some(branch)
                    },
                    email_ids: email_id,
                },
            )?;
            println!("Created {} advertisement {}", ad.kind, ad.id);
        }

        AdCommands::List { kind, company } => {
            let ads = db.list_advertisements(kind, company)?;
            if ads.is_empty() {
                println!("No advertisements found.");
            } else {
                println!(
                    "{:<10} {:<11} {:<30} {:<20} {:>8} {:<7}",
                    "ID", "KIND", "DESIGNATION", "COMPANY", "CTC", "ACTIVE"
                );
                println!("{}", "-".repeat(90));
                for ad in ads {
                    println!(
                        "{:<10} {:<11} {:<30} {:<20} {:>8.1} {:<7}",
                        short_id(&ad.id),
                        ad.kind,
                        truncate(&ad.designation, 28),
                        truncate(&ad.company_name.unwrap_or_default(), 18),
                        ad.ctc,
                        if ad.active { "yes" } else { "no" }
                    );
                }
            }
        }

        AdCommands::Show { id } => match db.get_advertisement(id)? {
            Some(ad) => {
                println!("Advertisement {}", ad.id);
                println!("Kind: {}", ad.kind);
                println!("Designation: {}", ad.designation);
                if let Some(company_name) = &ad.company_name {
                    println!("Company: {} (#{})", company_name, ad.company_id);
                }
                println!("Location: {}", ad.tentative_job_location);
                println!("Joining: {}", ad.tentative_join_date);
                println!("CTC: {}", ad.ctc);
                if let Some(gross) = ad.gross_salary {
                    println!("Gross salary: {}", gross);
                }
                println!("Bond: {}", if ad.bond { "yes" } else { "no" });
                println!("Min GPA: {}", ad.min_gpa);
                println!(
                    "Rounds: {} interviews, {} tests, {} HR",
                    ad.number_of_technical_interviews,
                    ad.number_of_technical_tests,
                    ad.number_of_hr_rounds
                );
                println!("Active: {}", if ad.active { "yes" } else { "no" });
                println!("Created: {}", ad.creation_timestamp);
                println!("\n{}", ad.description);

                let branches = db.eligible_branches(ad.id)?;
                if !branches.is_empty() {
                    println!("\nEligible branches ({}):", branches.len());
                    for branch in branches {
                        println!("  #{} {}", branch.id, branch.name);
                    }
                }
            }
            None => {
                println!("Advertisement {} not found.", id);
            }
        },
    }
    Ok(())
}

fn run_offer_command(db: &Database, command: OfferCommands) -> Result<()> {
    match command {
        OfferCommands::Add {
            kind,
            ad,
            student,
            company,
            resume,
            ppo,
            accepted,
        } => {
            let offer = service::create_offer(
                db,
                kind,
                &NewOffer {
                    student_id: student,
                    company_id: company,
                    advertisement_id: ad,
                    is_accepted: accepted,
                    ppo,
                    resume_id: resume,
                },
            )?;
            println!(
                "Created {} offer #{} ({}accepted)",
                offer.kind,
                offer.id,
                if offer.is_accepted { "" } else { "not " }
            );
        }

        OfferCommands::List { kind, company } => {
            let offers = db.list_offers(kind, company)?;
            if offers.is_empty() {
                println!("No offers found.");
            } else {
                println!(
                    "{:<6} {:<10} {:<20} {:<25} {:>8} {:<5} {:<9}",
                    "ID", "ROLL", "COMPANY", "DESIGNATION", "CTC", "PPO", "ACCEPTED"
                );
                println!("{}", "-".repeat(88));
                for offer in offers {
                    println!(
                        "{:<6} {:<10} {:<20} {:<25} {:>8.1} {:<5} {:<9}",
                        offer.id,
                        truncate(&offer.student_roll_no.unwrap_or_default(), 8),
                        truncate(&offer.company_name.unwrap_or_default(), 18),
                        truncate(&offer.designation, 23),
                        offer.ctc,
                        if offer.ppo { "yes" } else { "no" },
                        if offer.is_accepted { "yes" } else { "no" }
                    );
                }
            }
        }
    }
    Ok(())
}

fn run_refs_command(db: &Database, command: RefsCommands) -> Result<()> {
    match command {
        RefsCommands::AddStudent { roll_no, name } => {
            let id = db.add_student(&roll_no, &name)?;
            println!("Added student '{}' (ID: {})", roll_no, id);
        }

        RefsCommands::Students => {
            let students = db.list_students()?;
            if students.is_empty() {
                println!("No students found.");
            } else {
                println!("{:<6} {:<12} {:<30}", "ID", "ROLL", "NAME");
                println!("{}", "-".repeat(48));
                for student in students {
                    println!(
                        "{:<6} {:<12} {:<30}",
                        student.id,
                        student.roll_no,
                        truncate(&student.name, 28)
                    );
                }
            }
        }

        RefsCommands::RemoveStudent { id } => {
            if db.delete_student(id)? {
                println!("Removed student #{} (their offers went with them).", id);
            } else {
                println!("Student #{} not found.", id);
            }
        }

        RefsCommands::AddResume { student, file_path } => {
            let id = db.add_resume(student, &file_path)?;
            println!("Added resume (ID: {})", id);
        }

        RefsCommands::Resumes => {
            let resumes = db.list_resumes()?;
            if resumes.is_empty() {
                println!("No resumes found.");
            } else {
                println!("{:<6} {:<10} {:<40}", "ID", "STUDENT", "FILE");
                println!("{}", "-".repeat(56));
                for resume in resumes {
                    println!(
                        "{:<6} {:<10} {:<40}",
                        resume.id,
                        resume.student_id,
                        truncate(&resume.file_path, 38)
                    );
                }
            }
        }

        RefsCommands::RemoveResume { id } => {
            if db.delete_resume(id)? {
                println!("Removed resume #{}.", id);
            } else {
                println!("Resume #{} not found.", id);
            }
        }

        RefsCommands::AddBranch { name } => {
            let id = db.add_program_branch(&name)?;
            println!("Added program branch '{}' (ID: {})", name, id);
        }

        RefsCommands::Branches => {
            let branches = db.list_program_branches()?;
            if branches.is_empty() {
                println!("No program branches found.");
            } else {
                for branch in branches {
                    println!("#{} {}", branch.id, branch.name);
                }
            }
        }

        RefsCommands::AddEmail { email } => {
            let id = db.add_program_email(&email)?;
            println!("Added email id '{}' (ID: {})", email, id);
        }

        RefsCommands::Emails => {
            let emails = db.list_program_emails()?;
            if emails.is_empty() {
                println!("No email ids found.");
            } else {
                for entry in emails {
                    println!("#{} {}", entry.id, entry.email);
                }
            }
        }
    }
    Ok(())
}

fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
