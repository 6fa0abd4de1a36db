use std::collections::BTreeMap;
use std::sync::Arc;

use clap::Args;
use siteval::error::AppError;
use siteval::reporting::{
    AcknowledgeRequest, ActorContext, AdminConfigService, GenerateReportRequest, ReportService,
    RuleId, RuleUpdate, SiteId,
};
use siteval::scoring::{
    Answer, AnswerSheet, AnswerValue, Question, QuestionId, QuestionKind, ScoringEngine,
    ScoringModelConfig, YesNoAnswer,
};

use crate::infra::{
    seed_sites, InMemoryAuditLog, InMemoryConfigRepository, InMemoryReportRepository,
    InMemorySiteRepository, LoggingNotificationPublisher,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Demo a site with a failing Patient Safety assessment instead of a strong one.
    #[arg(long)]
    pub(crate) weak_site: bool,
    /// Skip the guarded admin-configuration portion of the demo.
    #[arg(long)]
    pub(crate) skip_admin: bool,
}

fn demo_questionnaire() -> Vec<Question> {
    let select = |id: &str, text: &str, category: &str, weight: f64| Question {
        id: QuestionId(id.to_string()),
        text: text.to_string(),
        category: category.to_string(),
        weight,
        is_knock_out: false,
        enabled: true,
        kind: QuestionKind::Select,
        keywords: Vec::new(),
    };

    vec![
        select(
            "q-quality",
            "Rate the site's quality management system",
            "Quality Management",
            5.0,
        ),
        select(
            "q-safety",
            "Rate the site's patient safety readiness",
            "Patient Safety",
            5.0,
        ),
        select("q-staff", "Rate investigator and coordinator coverage", "Staff", 4.0),
        select("q-infra", "Rate facilities and equipment", "Infrastructure", 3.0),
        Question {
            id: QuestionId("q-gcp".to_string()),
            text: "Does the site hold a current GCP certification?".to_string(),
            category: "Quality Management".to_string(),
            weight: 2.0,
            is_knock_out: true,
            enabled: true,
            kind: QuestionKind::YesNo,
            keywords: Vec::new(),
        },
        Question {
            id: QuestionId("q-emergency".to_string()),
            text: "Describe the site's emergency response procedures".to_string(),
            category: "Patient Safety".to_string(),
            weight: 2.0,
            is_knock_out: false,
            enabled: true,
            kind: QuestionKind::Text,
            keywords: vec!["evacuation".to_string(), "crash cart".to_string()],
        },
    ]
}

fn demo_answers(weak_site: bool) -> AnswerSheet {
    let mut sheet = BTreeMap::new();
    let safety_stars = if weak_site { 1 } else { 4 };

    sheet.insert(
        QuestionId("q-quality".to_string()),
        Answer::new(AnswerValue::Stars(4)),
    );
    sheet.insert(
        QuestionId("q-safety".to_string()),
        Answer::new(AnswerValue::Stars(safety_stars)),
    );
    sheet.insert(
        QuestionId("q-staff".to_string()),
        Answer::new(AnswerValue::Stars(4)),
    );
    sheet.insert(
        QuestionId("q-infra".to_string()),
        Answer::new(AnswerValue::Stars(3)),
    );
    sheet.insert(
        QuestionId("q-gcp".to_string()),
        Answer::new(AnswerValue::YesNo(YesNoAnswer::Yes)),
    );
    sheet.insert(
        QuestionId("q-emergency".to_string()),
        Answer::new(AnswerValue::Text(
            "Evacuation drills quarterly, crash cart on every floor".to_string(),
        )),
    );

    sheet
}

fn demo_actor() -> ActorContext {
    ActorContext {
        user_id: Some("user-demo".to_string()),
        name: "Demo Evaluator".to_string(),
        ip_address: "127.0.0.1".to_string(),
        user_agent: "siteval-cli-demo".to_string(),
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Clinical site evaluation demo");

    let engine = ScoringEngine::new(ScoringModelConfig::default());
    let questions = demo_questionnaire();
    let answers = demo_answers(args.weak_site);
    let outcome = engine.score(&answers, &questions);

    println!("\nScoring outcome");
    println!(
        "- Global score {} -> {} ({})",
        outcome.score,
        outcome.classification,
        outcome.status.label()
    );
    for (category, score) in &outcome.category_scores {
        println!("  - {category}: {score:.1}");
    }
    if let Some(reason) = &outcome.knock_out_reason {
        println!("  Gate reason: {reason}");
    }

    let sites = Arc::new(InMemorySiteRepository::seeded(seed_sites()));
    let reports = Arc::new(InMemoryReportRepository::default());
    let config = Arc::new(InMemoryConfigRepository::default());
    let audit = Arc::new(InMemoryAuditLog::default());
    let notifier = Arc::new(LoggingNotificationPublisher::default());
    let report_service = ReportService::new(
        sites,
        reports.clone(),
        config.clone(),
        audit.clone(),
        notifier.clone(),
    );

    let site_id = SiteId("site-centro-norte".to_string());

    let report = report_service.generate(
        GenerateReportRequest {
            site_id,
            generated_by_user_id: "user-demo".to_string(),
            category_scores: outcome.category_scores.clone(),
            scoring_status: outcome.status,
            global_score: outcome.score,
        },
        demo_actor(),
    )?;

    println!("\nGenerated report");
    println!("- Version: {}", report.report_version);
    println!("- Final status: {}", report.final_status.label());
    println!("- Hash: {}", report.hash_sha256);
    if report.capa_items.is_empty() {
        println!("- CAPA items: none");
    } else {
        println!("- CAPA items:");
        for item in &report.capa_items {
            println!(
                "  - [{}] {} within {} days",
                item.domain_name, item.required_action, item.timeline_days
            );
        }
    }
    println!("- Narrative: {}", report.narrative.executive_summary);

    let tampered = report_service.acknowledge(
        &report.id,
        AcknowledgeRequest {
            signed_by_name: "Demo Signer".to_string(),
            signed_by_role: "Principal Investigator".to_string(),
            hash_verification: "0000000000000000".to_string(),
        },
        demo_actor(),
    );
    match tampered {
        Err(err) => println!("\nTampered acknowledgment rejected: {err}"),
        Ok(_) => println!("\nUnexpected: tampered acknowledgment accepted"),
    }

    let signature = report_service.acknowledge(
        &report.id,
        AcknowledgeRequest {
            signed_by_name: "Demo Signer".to_string(),
            signed_by_role: "Principal Investigator".to_string(),
            hash_verification: report.hash_sha256.clone(),
        },
        demo_actor(),
    )?;
    println!(
        "Report acknowledged by {} ({}) and locked",
        signature.signed_by_name, signature.signed_by_role
    );

    if !args.skip_admin {
        let admin_service = AdminConfigService::new(config, audit.clone());
        let rule_id = RuleId("rule-safety-gap".to_string());
        let deactivate = RuleUpdate {
            active: Some(false),
            ..RuleUpdate::default()
        };

        println!("\nGuarded configuration demo");
        match admin_service.update_rule(&rule_id, deactivate.clone(), None, demo_actor()) {
            Err(err) => println!("- Critical edit without reason rejected: {err}"),
            Ok(_) => println!("- Unexpected: critical edit applied without reason"),
        }

        let updated = admin_service.update_rule(
            &rule_id,
            deactivate,
            Some("Superseded by sponsor SOP 14.2".to_string()),
            demo_actor(),
        )?;
        println!(
            "- Critical edit applied with reason; rule {} now version {} (active: {})",
            updated.id.0, updated.version, updated.active
        );
    }

    println!("\nAudit trail");
    for entry in audit.entries() {
        println!(
            "- [{}] {} {} by {}{}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.entity_type.label(),
            match entry.action {
                siteval::reporting::AuditAction::Generated => "generated",
                siteval::reporting::AuditAction::Acknowledged => "acknowledged",
                siteval::reporting::AuditAction::Updated => "updated",
            },
            entry.actor.name,
            if entry.is_critical_change {
                " [critical]"
            } else {
                ""
            }
        );
    }

    println!(
        "\nNotifications dispatched: {}",
        notifier.events().len()
    );
    println!("Signatures on file: {}", reports.signatures().len());

    Ok(())
}
