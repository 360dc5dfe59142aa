//! Career catalog: the closed set of career identifiers the assessment flow
//! may recommend. Shared with the front-end's career picker.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Career {
    pub id: &'static str,
    pub name: &'static str,
    pub summary: &'static str,
}

pub const CAREERS: &[Career] = &[
    Career {
        id: "software-engineer",
        name: "Software Engineer",
        summary: "Designs, builds and maintains software systems and applications.",
    },
    Career {
        id: "data-scientist",
        name: "Data Scientist",
        summary: "Turns data into insight with statistics, machine learning and experimentation.",
    },
    Career {
        id: "product-manager",
        name: "Product Manager",
        summary: "Decides what a product team builds and why, balancing users, business and technology.",
    },
    Career {
        id: "ux-designer",
        name: "UX Designer",
        summary: "Researches users and designs interfaces that are useful and easy to use.",
    },
    Career {
        id: "cybersecurity-analyst",
        name: "Cybersecurity Analyst",
        summary: "Protects systems and data by monitoring threats and hardening defenses.",
    },
    Career {
        id: "mechanical-engineer",
        name: "Mechanical Engineer",
        summary: "Designs and tests machines, engines and physical products.",
    },
    Career {
        id: "civil-engineer",
        name: "Civil Engineer",
        summary: "Plans and oversees infrastructure such as roads, bridges and water systems.",
    },
    Career {
        id: "physician",
        name: "Physician",
        summary: "Diagnoses and treats illness; requires medical school and residency.",
    },
    Career {
        id: "nurse",
        name: "Registered Nurse",
        summary: "Provides and coordinates patient care in clinical settings.",
    },
    Career {
        id: "lawyer",
        name: "Lawyer",
        summary: "Advises clients and represents them in legal matters.",
    },
    Career {
        id: "financial-analyst",
        name: "Financial Analyst",
        summary: "Evaluates investments and company performance to guide financial decisions.",
    },
    Career {
        id: "accountant",
        name: "Accountant",
        summary: "Prepares and audits financial records, taxes and compliance reports.",
    },
    Career {
        id: "marketing-manager",
        name: "Marketing Manager",
        summary: "Plans campaigns and brand strategy to reach and grow an audience.",
    },
    Career {
        id: "teacher",
        name: "Teacher",
        summary: "Educates students and designs lessons in schools or other learning settings.",
    },
    Career {
        id: "psychologist",
        name: "Psychologist",
        summary: "Studies behavior and provides assessment and therapy.",
    },
    Career {
        id: "architect",
        name: "Architect",
        summary: "Designs buildings and spaces, balancing aesthetics, function and safety.",
    },
    Career {
        id: "graphic-designer",
        name: "Graphic Designer",
        summary: "Creates visual communication for brands, products and media.",
    },
    Career {
        id: "journalist",
        name: "Journalist",
        summary: "Researches, writes and reports news and stories.",
    },
    Career {
        id: "biomedical-researcher",
        name: "Biomedical Researcher",
        summary: "Runs laboratory and clinical research to understand and treat disease.",
    },
    Career {
        id: "environmental-scientist",
        name: "Environmental Scientist",
        summary: "Studies the environment and develops ways to protect it.",
    },
];

pub fn career_ids() -> impl Iterator<Item = &'static str> {
    CAREERS.iter().map(|c| c.id)
}

/// Catalog rendered as a bullet list for prompts.
pub fn catalog_text() -> String {
    CAREERS
        .iter()
        .map(|c| format!("- {}: {}. {}", c.id, c.name, c.summary))
        .collect::<Vec<_>>()
        .join("\n")
}
