//! Deterministic fallback risk generator.
//!
//! Inspects profile fields against fixed thresholds. Used whenever AI output
//! for a category is missing or yields fewer than three valid items.

use super::types::{Impact, Likelihood, RiskCategory, RiskItem};
use crate::profile::{StartupProfile, text_len};

/// Minimum items a category should carry.
pub const MIN_RISKS_PER_CATEGORY: usize = 3;
/// Cap on items per category.
pub const MAX_RISKS_PER_CATEGORY: usize = 5;

/// Fallback risks for one category, padded to three and capped at five.
pub fn fallback_risks(category: RiskCategory, profile: &StartupProfile) -> Vec<RiskItem> {
    let mut risks = match category {
        RiskCategory::Financial => financial(profile),
        RiskCategory::Market => market(profile),
        RiskCategory::Team => team(profile),
        RiskCategory::Product => product(profile),
        RiskCategory::Operational => operational(profile),
    };

    let pads = [
        RiskItem::heuristic(
            category,
            format!("Insufficient {} Data", category.title()),
            4,
            Impact::Medium,
            format!(
                "Limited {category} information available for comprehensive risk assessment"
            ),
        )
        .mitigation(format!(
            "Provide more detailed {category} metrics and documentation"
        ))
        .concern(format!(
            "Cannot fully assess {category} risks due to data limitations"
        )),
        RiskItem::heuristic(
            category,
            format!("Unverified {} Assumptions", category.title()),
            3,
            Impact::Low,
            format!("{} claims have not been independently verified", category.title()),
        )
        .likelihood(Likelihood::Low)
        .mitigation("Validate key claims during due diligence"),
        RiskItem::heuristic(
            category,
            format!("Early Stage {} Uncertainty", category.title()),
            3,
            Impact::Low,
            format!("Early stage {category} outcomes carry inherent uncertainty"),
        )
        .likelihood(Likelihood::Medium)
        .concern("Outcomes depend on execution not yet demonstrated"),
    ];
    for pad in pads {
        if risks.len() >= MIN_RISKS_PER_CATEGORY {
            break;
        }
        risks.push(pad);
    }

    risks.truncate(MAX_RISKS_PER_CATEGORY);
    risks
}

fn financial(profile: &StartupProfile) -> Vec<RiskItem> {
    let cat = RiskCategory::Financial;
    let f = &profile.financials;
    let mut risks = Vec::new();

    if let Some(runway) = f.effective_runway_months() {
        if runway < 6.0 {
            risks.push(
                RiskItem::heuristic(
                    cat,
                    "Critical Runway Shortage",
                    10,
                    Impact::Critical,
                    format!("Critical: Only {runway:.1} months of runway remaining"),
                )
                .likelihood(Likelihood::High)
                .mitigation("Secure immediate funding or drastically reduce burn rate")
                .concern("High risk of company failure due to cash shortage"),
            );
        } else if runway < 12.0 {
            risks.push(
                RiskItem::heuristic(
                    cat,
                    "Short Financial Runway",
                    8,
                    Impact::High,
                    format!("Short runway: {runway:.1} months remaining"),
                )
                .likelihood(Likelihood::High)
                .mitigation("Accelerate fundraising efforts and optimize cash flow")
                .concern("Limited time to achieve milestones before next funding round"),
            );
        }
    }

    // Annual revenue against annual burn.
    if let (Some(revenue), Some(burn)) = (f.revenue, f.burn_rate)
        && revenue > 0.0
        && burn > 0.0
    {
        let coverage = revenue / (burn * 12.0);
        if coverage < 0.3 {
            risks.push(
                RiskItem::heuristic(
                    cat,
                    "Low Revenue Coverage",
                    7,
                    Impact::High,
                    format!(
                        "Annual revenue only covers {:.1}% of annual burn",
                        coverage * 100.0
                    ),
                )
                .likelihood(Likelihood::High)
                .mitigation("Increase sales and optimize burn rate")
                .concern("Long-term sustainability and cash runway are at risk"),
            );
        }
    }

    if f.revenue.is_none_or(|r| r == 0.0) {
        risks.push(
            RiskItem::heuristic(
                cat,
                "No Current Revenue",
                7,
                Impact::High,
                "Company has no reported current revenue",
            )
            .likelihood(Likelihood::High)
            .mitigation("Focus on customer acquisition and monetization strategy")
            .concern("No proven business model or market validation"),
        );
    }

    if let Some(growth) = f.growth_rate {
        if growth > 500.0 {
            risks.push(
                RiskItem::heuristic(
                    cat,
                    "Unrealistic Growth Projections",
                    8,
                    Impact::High,
                    format!("Growth rate of {growth}% appears unrealistic"),
                )
                .mitigation("Provide detailed justification for growth assumptions")
                .concern("Overly optimistic projections may indicate poor planning"),
            );
        } else if growth < 0.0 {
            risks.push(
                RiskItem::heuristic(
                    cat,
                    "Negative Growth Trend",
                    7,
                    Impact::High,
                    format!("Negative growth rate of {growth}% indicates declining business"),
                )
                .likelihood(Likelihood::High)
                .mitigation("Revise strategy to address declining metrics")
                .concern("Long-term viability is at risk"),
            );
        }
    }

    let nothing_reported = [f.revenue, f.burn_rate, f.funding_raised, f.growth_rate]
        .iter()
        .all(|v| v.is_none_or(|n| n == 0.0));
    if nothing_reported {
        risks.push(
            RiskItem::heuristic(
                cat,
                "Missing Financial Data",
                6,
                Impact::Medium,
                "Critical financial metrics are missing or unclear",
            )
            .mitigation("Provide full, verified financial statements")
            .concern("Inability to assess business health and returns"),
        );
    }

    risks
}

fn market(profile: &StartupProfile) -> Vec<RiskItem> {
    let cat = RiskCategory::Market;
    let m = &profile.market;
    let mut risks = Vec::new();

    if let Some(size) = m.size
        && size > 1e12
    {
        risks.push(
            RiskItem::heuristic(
                cat,
                "Inflated Market Size Claims",
                8,
                Impact::High,
                format!("Market size of ${:.0}B appears extremely inflated", size / 1e9),
            )
            .mitigation("Provide detailed market research and sizing methodology")
            .concern("Unrealistic market assumptions may indicate poor research"),
        );
    }

    match m.competitors.len() {
        0 => risks.push(
            RiskItem::heuristic(
                cat,
                "No Identified Competitors",
                6,
                Impact::Medium,
                "No competitors identified - may indicate poor market research",
            )
            .likelihood(Likelihood::High)
            .mitigation("Conduct thorough competitive analysis")
            .concern("Lack of market understanding or unrealistic assumptions"),
        ),
        n if n > 15 => risks.push(
            RiskItem::heuristic(
                cat,
                "Highly Competitive Market",
                7,
                Impact::High,
                format!("Market has {n} identified competitors"),
            )
            .likelihood(Likelihood::High)
            .mitigation("Develop strong differentiation strategy")
            .concern("Difficult to gain market share in crowded space"),
        ),
        _ => {}
    }

    if text_len(m.target_segment.as_deref()) < 20 {
        risks.push(
            RiskItem::heuristic(
                cat,
                "Unclear Target Market",
                5,
                Impact::Medium,
                "Target market definition is unclear or too broad",
            )
            .mitigation("Define specific target customer segments")
            .concern("Unclear go-to-market strategy"),
        );
    }

    risks
}

fn team(profile: &StartupProfile) -> Vec<RiskItem> {
    let cat = RiskCategory::Team;
    let t = &profile.team;
    let stage = profile.normalized_stage();
    let mut risks = Vec::new();

    if let Some(size) = t.size {
        let small_for_stage = if stage.contains("series_a") && size < 5.0 {
            Some((7, Impact::High, "Series A"))
        } else if stage.contains("series_b") && size < 10.0 {
            Some((6, Impact::Medium, "Series B"))
        } else {
            None
        };

        if let Some((severity, impact, label)) = small_for_stage {
            risks.push(
                RiskItem::heuristic(
                    cat,
                    "Small Team For Stage",
                    severity,
                    impact,
                    format!("Team size of {size} is small for {label} stage"),
                )
                .likelihood(Likelihood::High)
                .mitigation("Accelerate hiring of key roles")
                .concern("Insufficient capacity to execute growth plans"),
            );
        } else if size < 2.0 {
            risks.push(
                RiskItem::heuristic(
                    cat,
                    "Insufficient Team Size",
                    8,
                    Impact::High,
                    format!("Team size of {size} is insufficient for startup execution"),
                )
                .likelihood(Likelihood::High)
                .mitigation("Build core team with complementary skills")
                .concern("High execution risk with minimal team"),
            );
        }
    }

    match t.founders.len() {
        0 => risks.push(
            RiskItem::heuristic(
                cat,
                "No Founders Identified",
                9,
                Impact::Critical,
                "No founders identified in team information",
            )
            .likelihood(Likelihood::High)
            .mitigation("Clarify founding team structure")
            .concern("Unclear leadership and ownership structure"),
        ),
        1 => risks.push(
            RiskItem::heuristic(
                cat,
                "Single Founder Risk",
                6,
                Impact::Medium,
                "Single founder structure increases key person risk",
            )
            .mitigation("Consider bringing on co-founders or key executives")
            .concern("High dependency on single individual"),
        ),
        n if n > 4 => risks.push(
            RiskItem::heuristic(
                cat,
                "Too Many Founders",
                5,
                Impact::Medium,
                format!("{n} founders may lead to decision-making conflicts"),
            )
            .mitigation("Clearly define roles and decision-making processes")
            .concern("Decision making conflicts"),
        ),
        _ => {}
    }

    if t.key_hires.is_empty() && t.size.is_some_and(|s| s > 10.0) {
        risks.push(
            RiskItem::heuristic(
                cat,
                "No Key Hires Identified",
                4,
                Impact::Low,
                "No key hires identified despite team size - may indicate weak talent acquisition",
            )
            .mitigation("Recruit experienced professionals for critical roles")
            .concern("May lack specialized expertise for growth"),
        );
    }

    risks
}

fn product(profile: &StartupProfile) -> Vec<RiskItem> {
    let cat = RiskCategory::Product;
    let p = &profile.product;
    let mut risks = Vec::new();

    if text_len(p.competitive_advantage.as_deref()) < 30 {
        risks.push(
            RiskItem::heuristic(
                cat,
                "Unclear Competitive Advantage",
                6,
                Impact::Medium,
                "Product competitive advantage is unclear or poorly defined",
            )
            .likelihood(Likelihood::High)
            .mitigation("Clearly articulate unique value proposition")
            .concern("Difficulty differentiating from competitors"),
        );
    }

    if text_len(p.description.as_deref()) < 50 {
        risks.push(
            RiskItem::heuristic(
                cat,
                "Insufficient Product Description",
                5,
                Impact::Medium,
                "Product description is vague or insufficient",
            )
            .mitigation("Provide detailed product specifications and roadmap")
            .concern("Cannot assess product viability and market fit"),
        );
    }

    let product_stage = p.stage.as_deref().unwrap_or_default().to_lowercase();
    let early_product = product_stage.contains("concept") || product_stage.contains("idea");
    if early_product && profile.normalized_stage().contains("series_a") {
        risks.push(
            RiskItem::heuristic(
                cat,
                "Product Stage Mismatch",
                8,
                Impact::High,
                "Product still in concept stage but seeking Series A funding",
            )
            .likelihood(Likelihood::High)
            .mitigation("Accelerate product development and validation")
            .concern("High risk of product not meeting market needs"),
        );
    }

    if text_len(p.business_model.as_deref()) < 20 {
        risks.push(
            RiskItem::heuristic(
                cat,
                "Unclear Business Model",
                6,
                Impact::Medium,
                "Business model is unclear or not well defined",
            )
            .mitigation("Define and validate a clear, sustainable revenue model")
            .concern("Unpredictable returns due to a lack of monetization strategy"),
        );
    }

    risks
}

fn operational(profile: &StartupProfile) -> Vec<RiskItem> {
    let cat = RiskCategory::Operational;
    let t = &profile.traction;
    let mut risks = Vec::new();

    if let (Some(users), Some(customers)) = (t.users, t.customers)
        && users > 0.0
    {
        if customers == 0.0 {
            risks.push(
                RiskItem::heuristic(
                    cat,
                    "No Paying Customers",
                    6,
                    Impact::Medium,
                    format!("Has {users} users but no paying customers"),
                )
                .likelihood(Likelihood::High)
                .mitigation("Develop monetization strategy and pricing model")
                .concern("Unproven ability to generate revenue from users"),
            );
        } else if customers > 0.0 {
            let conversion = customers / users;
            if conversion < 0.01 {
                risks.push(
                    RiskItem::heuristic(
                        cat,
                        "Low Conversion Rate",
                        7,
                        Impact::High,
                        format!(
                            "Very low user-to-customer conversion rate ({:.2}%)",
                            conversion * 100.0
                        ),
                    )
                    .likelihood(Likelihood::High)
                    .mitigation("Improve product value proposition and pricing strategy")
                    .concern("Poor monetization efficiency"),
                );
            }
        }
    }

    let stage = profile.normalized_stage();
    if t.partnerships.is_empty() && (stage.contains("series_a") || stage.contains("series_b")) {
        risks.push(
            RiskItem::heuristic(
                cat,
                "No Strategic Partnerships",
                4,
                Impact::Low,
                "No partnerships identified for growth stage company",
            )
            .mitigation("Develop strategic partnerships for growth")
            .concern("Limited channels for market expansion"),
        );
    }

    if t.customers.is_none() && t.users.is_none() {
        risks.push(
            RiskItem::heuristic(
                cat,
                "Missing Traction Data",
                5,
                Impact::Medium,
                "No customer or user traction data available",
            )
            .likelihood(Likelihood::High)
            .mitigation("Provide comprehensive traction metrics")
            .concern("Cannot assess market validation and growth potential"),
        );
    }

    risks
}
