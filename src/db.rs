use chrono::{DateTime, Utc};
use rusqlite::{Connection, ToSql, params};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    AdKind, Advertisement, CompanyPerson, CompanyProfile, Country, NewAdvertisement, NewCompany,
    NewCompanyPerson, NewOffer, Offer, ProgramBranch, ProgramEmailId, Resume, Student, UserAccount,
};

pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    pub fn open() -> Result<Self> {
        Self::open_at(&Self::default_path())
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        // Deletion policies (cascade/set-null/restrict) live in the FK
        // clauses; SQLite only honors them with this pragma on.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn default_path() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "placement") {
            proj_dirs.data_dir().join("placement.db")
        } else {
            PathBuf::from("placement.db")
        }
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS user_accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS students (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                roll_no TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS resumes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
                file_path TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS program_branches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS program_email_ids (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS companies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL CHECK (length(name) BETWEEN 1 AND 50),
                user_id INTEGER NOT NULL UNIQUE REFERENCES user_accounts(id) ON DELETE CASCADE,
                domain TEXT NOT NULL CHECK (length(domain) BETWEEN 1 AND 30),
                url TEXT CHECK (url IS NULL OR length(url) <= 100),
                city TEXT CHECK (city IS NULL OR length(city) <= 15),
                state TEXT CHECK (state IS NULL OR length(state) <= 15),
                country TEXT NOT NULL CHECK (country IN ('1', '2')),
                pin_code TEXT CHECK (pin_code IS NULL OR length(pin_code) <= 10),
                contact TEXT NOT NULL CHECK (length(contact) BETWEEN 1 AND 20),
                registration_timestamp TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS company_persons (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL CHECK (length(name) BETWEEN 1 AND 30),
                company_id INTEGER NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
                designation TEXT NOT NULL CHECK (length(designation) BETWEEN 1 AND 30),
                phone TEXT NOT NULL CHECK (length(phone) BETWEEN 1 AND 15),
                email TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS advertisements (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL CHECK (kind IN ('job', 'internship')),
                company_id INTEGER NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
                expiry TEXT,
                active INTEGER NOT NULL DEFAULT 0,
                designation TEXT NOT NULL CHECK (length(designation) BETWEEN 1 AND 250),
                description TEXT NOT NULL,
                tentative_join_date TEXT NOT NULL,
                tentative_job_location TEXT NOT NULL CHECK (length(tentative_job_location) BETWEEN 1 AND 50),
                ad_file TEXT,
                ctc REAL NOT NULL,
                gross_salary REAL,
                bonus TEXT CHECK (bonus IS NULL OR length(bonus) <= 100),
                bond INTEGER NOT NULL,
                bond_details TEXT,
                resume_required INTEGER NOT NULL,
                resume_shortlist_criteria TEXT,
                aptitude_test_required INTEGER NOT NULL,
                group_discussion_required INTEGER NOT NULL,
                number_of_technical_interviews INTEGER NOT NULL DEFAULT 0 CHECK (number_of_technical_interviews >= 0),
                number_of_technical_tests INTEGER NOT NULL DEFAULT 0 CHECK (number_of_technical_tests >= 0),
                number_of_hr_rounds INTEGER NOT NULL DEFAULT 0 CHECK (number_of_hr_rounds >= 0),
                medical_test_required INTEGER NOT NULL,
                min_gpa REAL NOT NULL,
                number_of_members INTEGER CHECK (number_of_members IS NULL OR number_of_members >= 0),
                other_details TEXT,
                email_sent INTEGER NOT NULL DEFAULT 0,
                creation_timestamp TEXT NOT NULL,
                UNIQUE (id, kind)
            );

            CREATE TABLE IF NOT EXISTS ad_program_branches (
                advertisement_id TEXT NOT NULL REFERENCES advertisements(id) ON DELETE CASCADE,
                program_branch_id INTEGER NOT NULL REFERENCES program_branches(id) ON DELETE CASCADE,
                PRIMARY KEY (advertisement_id, program_branch_id)
            );

            CREATE TABLE IF NOT EXISTS ad_email_ids (
                advertisement_id TEXT NOT NULL REFERENCES advertisements(id) ON DELETE CASCADE,
                program_email_id INTEGER NOT NULL REFERENCES program_email_ids(id) ON DELETE CASCADE,
                PRIMARY KEY (advertisement_id, program_email_id)
            );

            CREATE TABLE IF NOT EXISTS offers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL CHECK (kind IN ('job', 'internship')),
                student_id INTEGER REFERENCES students(id) ON DELETE CASCADE,
                company_id INTEGER REFERENCES companies(id) ON DELETE SET NULL,
                advertisement_id TEXT NOT NULL,
                is_accepted INTEGER NOT NULL DEFAULT 0,
                ppo INTEGER NOT NULL DEFAULT 0,
                resume_id INTEGER REFERENCES resumes(id) ON DELETE RESTRICT,
                application_timestamp TEXT NOT NULL,
                FOREIGN KEY (advertisement_id, kind)
                    REFERENCES advertisements(id, kind) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_ads_company ON advertisements(company_id);
            CREATE INDEX IF NOT EXISTS idx_offers_company ON offers(company_id);
            CREATE INDEX IF NOT EXISTS idx_offers_student ON offers(student_id);
            CREATE INDEX IF NOT EXISTS idx_offers_ad ON offers(advertisement_id);
            "#,
        )?;
        Ok(())
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        let tables: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='companies'",
            [],
            |row| row.get(0),
        )?;
        if tables == 0 {
            return Err(Error::invalid(
                "database",
                "not initialized, run 'placement init' first",
            ));
        }
        Ok(())
    }

    // --- User accounts ---

    pub fn get_user_account(&self, id: i64) -> Result<Option<UserAccount>> {
        let result = self.conn.query_row(
            "SELECT id, username FROM user_accounts WHERE id = ?1",
            [id],
            |row| {
                Ok(UserAccount {
                    id: row.get(0)?,
                    username: row.get(1)?,
                })
            },
        );
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete_user_account(&self, id: i64) -> Result<bool> {
        Ok(self
            .conn
            .execute("DELETE FROM user_accounts WHERE id = ?1", [id])?
            > 0)
    }

    // --- Companies ---

    /// Insert the linked user account and the profile row in one transaction.
    pub fn register_company(
        &self,
        new: &NewCompany,
        registered_at: DateTime<Utc>,
    ) -> Result<i64> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO user_accounts (username) VALUES (?1)",
            [&new.username],
        )?;
        let user_id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO companies (name, user_id, domain, url, city, state, country, pin_code,
                                    contact, registration_timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                new.name,
                user_id,
                new.domain,
                new.url,
                new.city,
                new.state,
                new.country.as_str(),
                new.pin_code,
                new.contact,
                registered_at,
            ],
        )?;
        let company_id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(company_id)
    }

    pub fn get_company(&self, id: i64) -> Result<Option<CompanyProfile>> {
        let result = self.conn.query_row(
            &format!("{} WHERE c.id = ?1", COMPANY_SELECT),
            [id],
            Self::row_to_company,
        );
        match result {
            Ok(company) => Ok(Some(company)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_company_by_name(&self, name: &str) -> Result<Option<CompanyProfile>> {
        let result = self.conn.query_row(
            &format!("{} WHERE LOWER(c.name) = LOWER(?1)", COMPANY_SELECT),
            [name],
            Self::row_to_company,
        );
        match result {
            Ok(company) => Ok(Some(company)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_companies(&self) -> Result<Vec<CompanyProfile>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY c.name", COMPANY_SELECT))?;
        let rows = stmt.query_map([], Self::row_to_company)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn update_company(&self, company: &CompanyProfile) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE companies
             SET name = ?1, domain = ?2, url = ?3, city = ?4, state = ?5, country = ?6,
                 pin_code = ?7, contact = ?8
             WHERE id = ?9",
            params![
                company.name,
                company.domain,
                company.url,
                company.city,
                company.state,
                company.country.as_str(),
                company.pin_code,
                company.contact,
                company.id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Remove the profile row. Advertisements and contact persons go with it
    /// (cascade), offers keep their rows with `company_id` nulled out. The
    /// linked user account is cleaned up by the service layer afterwards.
    pub fn delete_company(&self, id: i64) -> Result<bool> {
        Ok(self.conn.execute("DELETE FROM companies WHERE id = ?1", [id])? > 0)
    }

    fn row_to_company(row: &rusqlite::Row) -> rusqlite::Result<CompanyProfile> {
        Ok(CompanyProfile {
            id: row.get(0)?,
            name: row.get(1)?,
            user_id: row.get(2)?,
            username: row.get(3)?,
            domain: row.get(4)?,
            url: row.get(5)?,
            city: row.get(6)?,
            state: row.get(7)?,
            country: country_column(row, 8)?,
            pin_code: row.get(9)?,
            contact: row.get(10)?,
            registration_timestamp: row.get(11)?,
        })
    }

    // --- Company persons ---

    pub fn add_company_person(&self, new: &NewCompanyPerson) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO company_persons (name, company_id, designation, phone, email)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![new.name, new.company_id, new.designation, new.phone, new.email],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_company_persons(&self, company_id: i64) -> Result<Vec<CompanyPerson>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, company_id, designation, phone, email
             FROM company_persons WHERE company_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map([company_id], |row| {
            Ok(CompanyPerson {
                id: row.get(0)?,
                name: row.get(1)?,
                company_id: row.get(2)?,
                designation: row.get(3)?,
                phone: row.get(4)?,
                email: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // --- Advertisements ---

    /// Insert the advertisement plus its branch/email attachments in one
    /// transaction. `eligible_program_branch = None` attaches every branch
    /// currently on record.
    pub fn create_advertisement(
        &self,
        id: Uuid,
        kind: AdKind,
        new: &NewAdvertisement,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO advertisements (
                 id, kind, company_id, expiry, active, designation, description,
                 tentative_join_date, tentative_job_location, ad_file, ctc, gross_salary,
                 bonus, bond, bond_details, resume_required, resume_shortlist_criteria,
                 aptitude_test_required, group_discussion_required,
                 number_of_technical_interviews, number_of_technical_tests,
                 number_of_hr_rounds, medical_test_required, min_gpa, number_of_members,
                 other_details, email_sent, creation_timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                     ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28)",
            params![
                id.to_string(),
                kind.as_str(),
                new.company_id,
                new.expiry,
                new.active,
                new.designation,
                new.description,
                new.tentative_join_date,
                new.tentative_job_location,
                new.ad_file,
                new.ctc,
                new.gross_salary,
                new.bonus,
                new.bond,
                new.bond_details,
                new.resume_required,
                new.resume_shortlist_criteria,
                new.aptitude_test_required,
                new.group_discussion_required,
                new.number_of_technical_interviews,
                new.number_of_technical_tests,
                new.number_of_hr_rounds,
                new.medical_test_required,
                new.min_gpa,
                new.number_of_members,
                new.other_details,
                false,
                created_at,
            ],
        )?;
        match &new.eligible_program_branch {
            Some(branch_ids) => {
                for branch_id in branch_ids {
                    tx.execute(
                        "INSERT INTO ad_program_branches (advertisement_id, program_branch_id)
                         VALUES (?1, ?2)",
                        params![id.to_string(), branch_id],
                    )?;
                }
            }
            None => {
                tx.execute(
                    "INSERT INTO ad_program_branches (advertisement_id, program_branch_id)
                     SELECT ?1, id FROM program_branches",
                    params![id.to_string()],
                )?;
            }
        }
        for email_id in &new.email_ids {
            tx.execute(
                "INSERT INTO ad_email_ids (advertisement_id, program_email_id)
                 VALUES (?1, ?2)",
                params![id.to_string(), email_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_advertisement(&self, id: Uuid) -> Result<Option<Advertisement>> {
        let result = self.conn.query_row(
            &format!("{} WHERE a.id = ?1", AD_SELECT),
            [id.to_string()],
            Self::row_to_advertisement,
        );
        match result {
            Ok(ad) => Ok(Some(ad)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_advertisements(
        &self,
        kind: Option<AdKind>,
        company_id: Option<i64>,
    ) -> Result<Vec<Advertisement>> {
        let mut sql = format!("{} WHERE 1=1", AD_SELECT);
        let mut sql_params: Vec<&dyn ToSql> = Vec::new();

        let kind_str = kind.map(|k| k.as_str().to_string());
        if let Some(ref k) = kind_str {
            sql.push_str(&format!(" AND a.kind = ?{}", sql_params.len() + 1));
            sql_params.push(k);
        }
        if let Some(ref cid) = company_id {
            sql.push_str(&format!(" AND a.company_id = ?{}", sql_params.len() + 1));
            sql_params.push(cid);
        }
        sql.push_str(" ORDER BY a.creation_timestamp DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(&sql_params[..], Self::row_to_advertisement)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn eligible_branches(&self, advertisement_id: Uuid) -> Result<Vec<ProgramBranch>> {
        let mut stmt = self.conn.prepare(
            "SELECT pb.id, pb.name FROM program_branches pb
             JOIN ad_program_branches apb ON apb.program_branch_id = pb.id
             WHERE apb.advertisement_id = ?1 ORDER BY pb.name",
        )?;
        let rows = stmt.query_map([advertisement_id.to_string()], |row| {
            Ok(ProgramBranch {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn row_to_advertisement(row: &rusqlite::Row) -> rusqlite::Result<Advertisement> {
        Ok(Advertisement {
            id: uuid_column(row, 0)?,
            kind: kind_column(row, 1)?,
            company_id: row.get(2)?,
            company_name: row.get(3)?,
            expiry: row.get(4)?,
            active: row.get(5)?,
            designation: row.get(6)?,
            description: row.get(7)?,
            tentative_join_date: row.get(8)?,
            tentative_job_location: row.get(9)?,
            ad_file: row.get(10)?,
            ctc: row.get(11)?,
            gross_salary: row.get(12)?,
            bonus: row.get(13)?,
            bond: row.get(14)?,
            bond_details: row.get(15)?,
            resume_required: row.get(16)?,
            resume_shortlist_criteria: row.get(17)?,
            aptitude_test_required: row.get(18)?,
            group_discussion_required: row.get(19)?,
            number_of_technical_interviews: row.get(20)?,
            number_of_technical_tests: row.get(21)?,
            number_of_hr_rounds: row.get(22)?,
            medical_test_required: row.get(23)?,
            min_gpa: row.get(24)?,
            number_of_members: row.get(25)?,
            other_details: row.get(26)?,
            email_sent: row.get(27)?,
            creation_timestamp: row.get(28)?,
        })
    }

    // --- Offers ---

    pub fn insert_offer(
        &self,
        kind: AdKind,
        new: &NewOffer,
        applied_at: DateTime<Utc>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO offers (kind, student_id, company_id, advertisement_id, is_accepted,
                                 ppo, resume_id, application_timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                kind.as_str(),
                new.student_id,
                new.company_id,
                new.advertisement_id.to_string(),
                new.is_accepted,
                new.ppo,
                new.resume_id,
                applied_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_offer(&self, id: i64) -> Result<Option<Offer>> {
        let result = self.conn.query_row(
            &format!("{} WHERE o.id = ?1", OFFER_SELECT),
            [id],
            Self::row_to_offer,
        );
        match result {
            Ok(offer) => Ok(Some(offer)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_offers(&self, kind: AdKind, company_id: Option<i64>) -> Result<Vec<Offer>> {
        let mut sql = format!("{} WHERE o.kind = ?1", OFFER_SELECT);
        let kind_str = kind.as_str().to_string();
        let mut sql_params: Vec<&dyn ToSql> = vec![&kind_str];

        if let Some(ref cid) = company_id {
            sql.push_str(&format!(" AND o.company_id = ?{}", sql_params.len() + 1));
            sql_params.push(cid);
        }
        sql.push_str(" ORDER BY o.application_timestamp DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(&sql_params[..], Self::row_to_offer)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn row_to_offer(row: &rusqlite::Row) -> rusqlite::Result<Offer> {
        Ok(Offer {
            id: row.get(0)?,
            kind: kind_column(row, 1)?,
            student_id: row.get(2)?,
            student_roll_no: row.get(3)?,
            company_id: row.get(4)?,
            company_name: row.get(5)?,
            advertisement_id: uuid_column(row, 6)?,
            designation: row.get(7)?,
            ctc: row.get(8)?,
            is_accepted: row.get(9)?,
            ppo: row.get(10)?,
            resume_id: row.get(11)?,
            application_timestamp: row.get(12)?,
        })
    }

    // --- Reference rows (students, resumes, program data) ---

    pub fn add_student(&self, roll_no: &str, name: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO students (roll_no, name) VALUES (?1, ?2)",
            params![roll_no, name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_student(&self, id: i64) -> Result<Option<Student>> {
        let result = self.conn.query_row(
            "SELECT id, roll_no, name FROM students WHERE id = ?1",
            [id],
            |row| {
                Ok(Student {
                    id: row.get(0)?,
                    roll_no: row.get(1)?,
                    name: row.get(2)?,
                })
            },
        );
        match result {
            Ok(student) => Ok(Some(student)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_students(&self) -> Result<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, roll_no, name FROM students ORDER BY roll_no")?;
        let rows = stmt.query_map([], |row| {
            Ok(Student {
                id: row.get(0)?,
                roll_no: row.get(1)?,
                name: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Offers are removed before the student row: the student's resume
    /// cascade would otherwise trip the RESTRICT on `offers.resume_id`.
    pub fn delete_student(&self, id: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM offers WHERE student_id = ?1", [id])?;
        let removed = tx.execute("DELETE FROM students WHERE id = ?1", [id])? > 0;
        tx.commit()?;
        Ok(removed)
    }

    pub fn add_resume(&self, student_id: i64, file_path: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO resumes (student_id, file_path) VALUES (?1, ?2)",
            params![student_id, file_path],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_resume(&self, id: i64) -> Result<Option<Resume>> {
        let result = self.conn.query_row(
            "SELECT id, student_id, file_path FROM resumes WHERE id = ?1",
            [id],
            |row| {
                Ok(Resume {
                    id: row.get(0)?,
                    student_id: row.get(1)?,
                    file_path: row.get(2)?,
                })
            },
        );
        match result {
            Ok(resume) => Ok(Some(resume)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_resumes(&self) -> Result<Vec<Resume>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, student_id, file_path FROM resumes ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Resume {
                id: row.get(0)?,
                student_id: row.get(1)?,
                file_path: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Protect policy: a resume referenced by any offer cannot be deleted.
    /// The RESTRICT foreign key backs this up at the SQL level.
    pub fn delete_resume(&self, id: i64) -> Result<bool> {
        let referenced: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM offers WHERE resume_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        if referenced > 0 {
            return Err(Error::Protected { entity: "resume" });
        }
        Ok(self.conn.execute("DELETE FROM resumes WHERE id = ?1", [id])? > 0)
    }

    pub fn add_program_branch(&self, name: &str) -> Result<i64> {
        self.conn
            .execute("INSERT INTO program_branches (name) VALUES (?1)", [name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_program_branches(&self) -> Result<Vec<ProgramBranch>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM program_branches ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(ProgramBranch {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn add_program_email(&self, email: &str) -> Result<i64> {
        self.conn
            .execute("INSERT INTO program_email_ids (email) VALUES (?1)", [email])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_program_emails(&self) -> Result<Vec<ProgramEmailId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, email FROM program_email_ids ORDER BY email")?;
        let rows = stmt.query_map([], |row| {
            Ok(ProgramEmailId {
                id: row.get(0)?,
                email: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

const COMPANY_SELECT: &str = "SELECT c.id, c.name, c.user_id, u.username, c.domain, c.url,
        c.city, c.state, c.country, c.pin_code, c.contact, c.registration_timestamp
 FROM companies c
 LEFT JOIN user_accounts u ON c.user_id = u.id";

const AD_SELECT: &str = "SELECT a.id, a.kind, a.company_id, c.name, a.expiry, a.active,
        a.designation, a.description, a.tentative_join_date, a.tentative_job_location,
        a.ad_file, a.ctc, a.gross_salary, a.bonus, a.bond, a.bond_details,
        a.resume_required, a.resume_shortlist_criteria, a.aptitude_test_required,
        a.group_discussion_required, a.number_of_technical_interviews,
        a.number_of_technical_tests, a.number_of_hr_rounds, a.medical_test_required,
        a.min_gpa, a.number_of_members, a.other_details, a.email_sent, a.creation_timestamp
 FROM advertisements a
 JOIN companies c ON a.company_id = c.id";

const OFFER_SELECT: &str = "SELECT o.id, o.kind, o.student_id, s.roll_no, o.company_id, c.name,
        o.advertisement_id, a.designation, a.ctc, o.is_accepted, o.ppo, o.resume_id,
        o.application_timestamp
 FROM offers o
 JOIN advertisements a ON o.advertisement_id = a.id
 LEFT JOIN students s ON o.student_id = s.id
 LEFT JOIN companies c ON o.company_id = c.id";

fn uuid_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn kind_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<AdKind> {
    let raw: String = row.get(idx)?;
    AdKind::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown advertisement kind '{raw}'").into(),
        )
    })
}

fn country_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Country> {
    let raw: String = row.get(idx)?;
    Country::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown country '{raw}'").into(),
        )
    })
}
