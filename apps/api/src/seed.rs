//! Demo data used to seed empty job and candidate partitions.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::candidate::{Candidate, CandidateStage, Education, WorkExperience};
use crate::models::job::{Job, JobRequirement, JobStatus};

fn ts(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap_or_default()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn requirements(items: &[(&str, bool)]) -> Vec<JobRequirement> {
    items
        .iter()
        .enumerate()
        .map(|(i, (description, is_required))| JobRequirement {
            id: (i + 1).to_string(),
            description: description.to_string(),
            is_required: *is_required,
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn job(
    id: &str,
    title: &str,
    department: &str,
    location: &str,
    description: &str,
    reqs: &[(&str, bool)],
    skills: &[&str],
    created: &str,
    applications: u32,
) -> Job {
    Job {
        id: id.to_string(),
        title: title.to_string(),
        department: department.to_string(),
        location: location.to_string(),
        job_type: "full-time".to_string(),
        description: description.to_string(),
        requirements: requirements(reqs),
        skills: strings(skills),
        status: JobStatus::Published,
        applications,
        created_at: ts(created),
        updated_at: ts(created),
    }
}

pub fn mock_jobs() -> Vec<Job> {
    vec![
        job(
            "1",
            "Senior Frontend Developer",
            "Technology",
            "Remote",
            "Senior frontend developer with React, TypeScript and solid engineering practices.",
            &[
                ("3+ years of React experience", true),
                ("TypeScript experience", true),
                ("UI/UX knowledge", false),
            ],
            &["React", "TypeScript", "HTML", "CSS", "JavaScript"],
            "2023-05-10T14:30:00Z",
            24,
        ),
        job(
            "2",
            "UX/UI Designer",
            "Design",
            "Hybrid",
            "Designer building user interfaces for web and mobile applications.",
            &[
                ("2+ years in UX/UI design", true),
                ("Demonstrable portfolio", true),
                ("Figma experience", true),
            ],
            &["Figma", "Adobe XD", "Sketch", "User Research", "Prototyping"],
            "2023-05-15T10:00:00Z",
            18,
        ),
        job(
            "3",
            "Project Manager",
            "Operations",
            "On-site",
            "Project manager for software delivery projects.",
            &[
                ("3+ years managing projects", true),
                ("PMP or similar certification", false),
                ("Agile methodologies", true),
            ],
            &["Scrum", "Kanban", "Jira", "Confluence", "MS Project"],
            "2023-05-20T09:15:00Z",
            12,
        ),
        job(
            "4",
            "Backend Developer",
            "Technology",
            "Remote",
            "Backend developer with Node.js and database experience.",
            &[
                ("2+ years with Node.js", true),
                ("SQL and NoSQL databases", true),
                ("Docker knowledge", false),
            ],
            &["Node.js", "Express", "MongoDB", "PostgreSQL", "Docker"],
            "2023-05-25T11:45:00Z",
            20,
        ),
        job(
            "5",
            "DevOps Engineer",
            "Technology",
            "Remote",
            "DevOps engineer with AWS and CI/CD experience.",
            &[
                ("3+ years in DevOps", true),
                ("AWS certification", false),
                ("Terraform experience", true),
            ],
            &["AWS", "Docker", "Kubernetes", "Terraform", "Jenkins", "GitHub Actions"],
            "2023-06-01T13:00:00Z",
            15,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn candidate(
    id: &str,
    job_id: &str,
    name: &str,
    location: &str,
    position: &str,
    company: &str,
    skills: &[&str],
    stage: CandidateStage,
    score: u8,
    created: &str,
) -> Candidate {
    let slug = name.to_lowercase().replace(' ', ".");
    Candidate {
        id: id.to_string(),
        job_id: job_id.to_string(),
        name: name.to_string(),
        email: format!("{slug}@example.com"),
        phone: "+34 612 345 678".to_string(),
        location: location.to_string(),
        resume_url: format!("https://example.com/resumes/{}.pdf", slug.replace('.', "_")),
        work_experience: vec![WorkExperience {
            id: "1".to_string(),
            company: company.to_string(),
            position: position.to_string(),
            start_date: date(2020, 3, 1),
            end_date: None,
            description: format!("{position} at {company}"),
        }],
        education: vec![Education {
            id: "1".to_string(),
            institution: "Universidad Politécnica de Madrid".to_string(),
            degree: "Bachelor".to_string(),
            field: "Computer Science".to_string(),
            start_date: date(2014, 9, 1),
            end_date: Some(date(2018, 6, 30)),
        }],
        skills: strings(skills),
        stage,
        score,
        notes: String::new(),
        created_at: ts(created),
        updated_at: ts(created),
    }
}

pub fn mock_candidates() -> Vec<Candidate> {
    vec![
        candidate(
            "1",
            "1",
            "Ana Garcia",
            "Madrid, Spain",
            "Frontend Developer",
            "TechCorp",
            &["React", "TypeScript", "JavaScript", "HTML", "CSS"],
            CandidateStage::Interview,
            85,
            "2023-05-12T09:00:00Z",
        ),
        candidate(
            "2",
            "1",
            "Carlos Rodriguez",
            "Barcelona, Spain",
            "Senior Frontend Developer",
            "Digital Agency",
            &["React", "Vue.js", "TypeScript", "Redux"],
            CandidateStage::Technical,
            92,
            "2023-05-13T10:30:00Z",
        ),
        candidate(
            "3",
            "1",
            "Laura Martinez",
            "Valencia, Spain",
            "Web Developer",
            "StartupXYZ",
            &["JavaScript", "React", "CSS"],
            CandidateStage::Screening,
            78,
            "2023-05-14T11:15:00Z",
        ),
        candidate(
            "4",
            "2",
            "David Lopez",
            "Sevilla, Spain",
            "UX Designer",
            "Creative Studio",
            &["Figma", "Sketch", "User Research"],
            CandidateStage::Interview,
            88,
            "2023-05-17T08:45:00Z",
        ),
        candidate(
            "5",
            "2",
            "Elena Sanchez",
            "Bilbao, Spain",
            "UI Designer",
            "DesignHub",
            &["Figma", "Adobe XD", "Prototyping"],
            CandidateStage::Final,
            90,
            "2023-05-18T14:20:00Z",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_seeded_candidate_references_a_seeded_job() {
        let jobs = mock_jobs();
        for c in mock_candidates() {
            assert!(jobs.iter().any(|j| j.id == c.job_id), "{} has no job", c.id);
        }
    }

    #[test]
    fn test_seed_timestamps_parse() {
        assert!(mock_jobs().iter().all(|j| j.created_at.timestamp() > 0));
        assert_eq!(mock_candidates()[0].email, "ana.garcia@example.com");
    }
}
