//! The fixed set of business documents the assistant produces.
//!
//! Every per-kind fact (display name, CLI slug, prompt outline) lives in a
//! single descriptor table so adding a kind is one variant plus one row.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the seven business documents generated for an idea.
///
/// Declaration order is the display and default-selection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    /// Investor/customer-facing business proposal.
    Proposal,
    /// Full business plan.
    BusinessPlan,
    /// Market research report.
    MarketResearch,
    /// Strategic product roadmap.
    Roadmap,
    /// First-year quarterly milestones.
    Milestones,
    /// Three-year financial projection outline.
    FinancialProjection,
    /// Technical product requirements document.
    TechnicalPrd,
}

/// Static facts about a [`DocumentKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDescriptor {
    /// The kind this row describes.
    pub kind: DocumentKind,
    /// Human-readable name, also used to build download filenames.
    pub display_name: &'static str,
    /// Kebab-case identifier accepted on the command line.
    pub slug: &'static str,
    /// Kind-specific instruction embedded in the generation prompt.
    pub outline: &'static str,
}

const DESCRIPTORS: [KindDescriptor; 7] = [
    KindDescriptor {
        kind: DocumentKind::Proposal,
        display_name: "Business Proposal",
        slug: "proposal",
        outline: "Generate a comprehensive business proposal based on this idea. \
The proposal should include at least the following sections: Executive Summary, \
Problem Statement, Proposed Solution, Target Market, Competitive Analysis, \
Marketing and Sales Strategy, Management Team (if applicable), and Call to Action.",
    },
    KindDescriptor {
        kind: DocumentKind::BusinessPlan,
        display_name: "Business Plan",
        slug: "business-plan",
        outline: "Generate a detailed business plan based on this idea. The business plan \
should cover: Executive Summary, Company Description, Products and Services, Market Analysis \
(including industry overview, target market, competition), Strategy and Implementation \
(including marketing plan, sales plan, operations plan), Management Team, and a Financial Plan \
outline. For the financial plan, detail key assumptions and suggest placeholders for specific \
projections like income statement, cash flow, and balance sheet unless you can provide \
illustrative examples based on common business models for such an idea, clearly stating they \
are illustrative.",
    },
    KindDescriptor {
        kind: DocumentKind::MarketResearch,
        display_name: "Market Research",
        slug: "market-research",
        outline: "Generate a market research report based on this idea. The report should include:
1.  **Target Audience:** Detailed description (demographics, psychographics, needs, pain points, buying behavior).
2.  **Market Size and Trends:** Estimation of TAM, SAM, SOM. For specific market size numbers, use placeholders like \"[TAM: specific research needed]\" or provide illustrative ranges if commonly known for similar ideas, stating clearly they are illustrative. Identify key industry growth trends.
3.  **Competitive Landscape:** Identify 3-5 key competitors, their main products/services, strengths, weaknesses, pricing strategies (if general knowledge, otherwise placeholder), and market positioning.
4.  **SWOT Analysis (for the business idea):** Strengths, Weaknesses, Opportunities, and Threats relevant to the market.
5.  **Potential Market Gaps & Opportunities:** Unmet customer needs or underserved segments.",
    },
    KindDescriptor {
        kind: DocumentKind::Roadmap,
        display_name: "Product Roadmap",
        slug: "roadmap",
        outline: "Generate a strategic product roadmap for the first 1-2 years based on this \
idea. Outline key phases (e.g., Phase 1: MVP Development, Phase 2: Beta Launch & Feedback, \
Phase 3: V1.0 Launch, Phase 4: Growth & Feature Expansion). For each phase, detail: Goals, \
Key Features/Initiatives, Estimated Timeline (e.g., \"3 months\", \"Q1-Y1\"), and Key Metrics \
for Success.",
    },
    KindDescriptor {
        kind: DocumentKind::Milestones,
        display_name: "Key Milestones",
        slug: "milestones",
        outline: "Generate a list of key milestones for the first year, broken down quarterly, \
based on this idea. For each milestone, provide: Milestone Description, Key Performance \
Indicators (KPIs) (e.g., \"User sign-ups: [Target Number]\", \"Partnerships: [Target Number]\"), \
and Target Completion (e.g., End of Q1). Milestones should cover aspects like: Legal & Setup, \
Product Development, Funding (if applicable, e.g. \"Secure Seed Funding: [Target Amount]\"), \
Marketing & Sales, Team Building.",
    },
    KindDescriptor {
        kind: DocumentKind::FinancialProjection,
        display_name: "Financial Projections",
        slug: "financial-projection",
        outline: "Provide a high-level 3-year financial projection outline based on this idea. This should include:
1.  **Key Assumptions:** Clearly list 3-5 major assumptions (e.g., \"Customer acquisition rate: [Specify rate or placeholder]\", \"Pricing: [Specify or placeholder]\", \"COGS percentage: [Specify or placeholder]\").
2.  **Revenue Streams:** Identify primary ways the business will generate money.
3.  **Major Cost Categories:** (e.g., COGS/COS, R&D, Sales & Marketing, G&A, Salaries).
4.  **Projected Summary Outline (Year 1, Year 2, Year 3):** For each year, list categories for Total Revenue, Total COGS/COS, Gross Profit, Total Operating Expenses, and Net Profit/Loss Before Tax. Use placeholders like \"[Projected Y1 Revenue]\" or provide illustrative calculations if assumptions are clearly stated as illustrative.",
    },
    KindDescriptor {
        kind: DocumentKind::TechnicalPrd,
        display_name: "Technical PRD",
        slug: "technical-prd",
        outline: "Generate a Technical Product Requirements Document (PRD) outline based on \
this idea. The PRD should cover: Introduction/Overview, Goals and Objectives, Target \
Users/User Personas, User Stories & Key Features (prioritized), Functional Requirements, \
Non-Functional Requirements (Performance, Scalability, Security, Usability, Reliability - use \
placeholders for specific metrics like \"[Page load time target]\"), High-Level Technical Stack \
Considerations, Data Management, Release Criteria.",
    },
];

impl DocumentKind {
    /// All kinds in display order.
    pub const ALL: [DocumentKind; 7] = [
        DocumentKind::Proposal,
        DocumentKind::BusinessPlan,
        DocumentKind::MarketResearch,
        DocumentKind::Roadmap,
        DocumentKind::Milestones,
        DocumentKind::FinancialProjection,
        DocumentKind::TechnicalPrd,
    ];

    /// The first kind in display order, selected after a batch completes.
    pub const fn first() -> Self {
        Self::ALL[0]
    }

    /// Descriptor row for this kind.
    pub fn descriptor(self) -> &'static KindDescriptor {
        // Rows are declared in variant order.
        &DESCRIPTORS[self as usize]
    }

    /// Human-readable name, e.g. `"Market Research"`.
    pub fn display_name(self) -> &'static str {
        self.descriptor().display_name
    }

    /// Kebab-case identifier, e.g. `"market-research"`.
    pub fn slug(self) -> &'static str {
        self.descriptor().slug
    }

    /// Section outline used by the generation prompt.
    pub fn outline(self) -> &'static str {
        self.descriptor().outline
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Error returned when a string names no known document kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown document kind '{input}' (expected one of: {expected})")]
pub struct ParseKindError {
    input: String,
    expected: String,
}

impl FromStr for DocumentKind {
    type Err = ParseKindError;

    /// Accepts a slug or a display name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        DESCRIPTORS
            .iter()
            .find(|row| {
                row.slug.eq_ignore_ascii_case(needle)
                    || row.display_name.eq_ignore_ascii_case(needle)
            })
            .map(|row| row.kind)
            .ok_or_else(|| ParseKindError {
                input: s.to_owned(),
                expected: DESCRIPTORS
                    .iter()
                    .map(|row| row.slug)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
