//! Résumé → candidate derivation.
//!
//! There is no real extraction, so everything beyond the résumé's own
//! analysis fields is plausible demo data. All randomness comes from the
//! caller's `Rng` and the clock is the `now` argument, so a seeded generator
//! reproduces the same candidates exactly.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;

use crate::models::candidate::{Candidate, CandidateStage, Education, WorkExperience};
use crate::models::job::Job;
use crate::models::resume::{candidate_id_for, ResumeRecord};

const LOCATIONS: [&str; 6] = ["Madrid", "Barcelona", "Valencia", "Sevilla", "Bilbao", "Málaga"];

/// Probability a job skill is kept when the résumé carries no keywords.
const SKILL_KEEP_PROBABILITY: f64 = 0.7;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Builds a display name from the file stem: `maria_lopez-cv.pdf` → `Maria Lopez Cv`.
pub fn display_name_from_file(file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or_default();
    let name = stem
        .split(['_', '-', ' '])
        .filter(|t| !t.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        "Unknown Candidate".to_string()
    } else {
        name
    }
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derives a candidate from an analyzed, job-linked résumé.
///
/// Returns `None` unless the résumé is analyzed, has a `job_id`, and that job exists.
pub fn derive_candidate<R: Rng + ?Sized>(
    resume: &ResumeRecord,
    jobs: &[Job],
    rng: &mut R,
    now: DateTime<Utc>,
) -> Option<Candidate> {
    if !resume.analyzed {
        return None;
    }
    let job_id = resume.job_id.as_deref()?;
    let job = jobs.iter().find(|j| j.id == job_id)?;

    let id = resume
        .candidate_id
        .clone()
        .unwrap_or_else(|| candidate_id_for(&resume.id));

    let name = display_name_from_file(&resume.name);
    let email = format!("{}@gmail.com", name.to_lowercase().replace(' ', "."));
    let phone = format!(
        "+34 {} {} {}",
        rng.random_range(100..1000),
        rng.random_range(100..1000),
        rng.random_range(100..1000)
    );
    let location = LOCATIONS[rng.random_range(0..LOCATIONS.len())].to_string();

    let skills = match &resume.keywords {
        Some(keywords) => keywords.clone(),
        None => job
            .skills
            .iter()
            .filter(|_| rng.random_bool(SKILL_KEEP_PROBABILITY))
            .cloned()
            .collect(),
    };

    let score = match resume.match_score {
        Some(score) => score,
        None => rng.random_range(60..100),
    };

    let work_experience = vec![
        WorkExperience {
            id: format!("work-{id}-1"),
            company: "Example Company Ltd.".to_string(),
            position: job.title.clone(),
            start_date: date(2020, 1, 1),
            end_date: None,
            description: "Performs duties closely related to the advertised role.".to_string(),
        },
        WorkExperience {
            id: format!("work-{id}-2"),
            company: "Previous Employer Inc.".to_string(),
            position: "Junior role".to_string(),
            start_date: date(2018, 6, 1),
            end_date: Some(date(2019, 12, 31)),
            description: "Gained experience in tasks similar to those required.".to_string(),
        },
    ];

    let education = vec![Education {
        id: format!("edu-{id}-1"),
        institution: "Universidad de España".to_string(),
        degree: "Bachelor".to_string(),
        field: "Field related to the role".to_string(),
        start_date: date(2014, 9, 1),
        end_date: Some(date(2018, 6, 30)),
    }];

    Some(Candidate {
        id,
        job_id: job.id.clone(),
        name,
        email,
        phone,
        location,
        resume_url: format!("/resumes/{}", resume.id),
        work_experience,
        education,
        skills,
        stage: CandidateStage::Applied,
        score,
        notes: String::new(),
        created_at: resume.analyzed_at.unwrap_or(resume.uploaded_at),
        updated_at: now,
    })
}

/// Result of a merge: the new candidate set and the ids derived this round.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub candidates: Vec<Candidate>,
    pub derived_ids: Vec<String>,
}

/// Full recompute-and-merge of the résumé-derived candidates.
///
/// Every eligible résumé (analyzed, job-linked, marked for conversion) is
/// derived afresh. Existing candidates whose id collides with a derived one
/// are dropped; all others are kept in order, followed by the derived set.
pub fn sync_candidates<R: Rng + ?Sized>(
    resumes: &[ResumeRecord],
    jobs: &[Job],
    existing: &[Candidate],
    rng: &mut R,
    now: DateTime<Utc>,
) -> Merged {
    let derived: Vec<Candidate> = resumes
        .iter()
        .filter(|r| r.analyzed && r.job_id.is_some() && r.candidate_id.is_some())
        .filter_map(|r| derive_candidate(r, jobs, rng, now))
        .collect();

    let derived_ids: HashSet<&str> = derived.iter().map(|c| c.id.as_str()).collect();

    let candidates = existing
        .iter()
        .filter(|c| !derived_ids.contains(c.id.as_str()))
        .cloned()
        .chain(derived.iter().cloned())
        .collect();
    Merged {
        candidates,
        derived_ids: derived.into_iter().map(|c| c.id).collect(),
    }
}
