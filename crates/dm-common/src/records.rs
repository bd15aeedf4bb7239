//! Maps raw job/applicant JSON onto [`Job`] and [`Candidate`].
//!
//! Both the nested export shape (`{"perfil_vaga": {"nivel_ingles": ..}}`) and the
//! flattened table shape (`{"perfil.nivel_ingles": ..}`) are accepted. Non-string values
//! are read as absent.

use std::path::Path;

use serde_json::{Map, Value};

use crate::artifacts::{read_json, ArtifactError};
use crate::error::DataError;
use crate::{Candidate, Job};

/// A group of fields: nested under `nested`, or flattened as `<prefix>.<key>`.
struct Section {
    nested: &'static str,
    flat_prefixes: &'static [&'static str],
}

const JOB_INFO: Section = Section {
    nested: "informacoes_basicas",
    flat_prefixes: &["info", "informacoes_basicas"],
};
const JOB_PROFILE: Section = Section {
    nested: "perfil_vaga",
    flat_prefixes: &["perfil", "perfil_vaga"],
};
const CANDIDATE_BASICS: Section = Section {
    nested: "infos_basicas",
    flat_prefixes: &["infos_basicas"],
};
const CANDIDATE_PROFESSIONAL: Section = Section {
    nested: "informacoes_profissionais",
    flat_prefixes: &["informacoes_profissionais"],
};
const CANDIDATE_LANGUAGES: Section = Section {
    nested: "formacao_e_idiomas",
    flat_prefixes: &["formacao_e_idiomas"],
};

fn lookup<'a>(record: &'a Map<String, Value>, section: &Section, key: &str) -> Option<&'a Value> {
    record
        .get(section.nested)
        .and_then(|nested| nested.get(key))
        .or_else(|| {
            section
                .flat_prefixes
                .iter()
                .find_map(|prefix| record.get(&format!("{prefix}.{key}")))
        })
}

fn text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn id_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_object<'a>(id: &str, value: &'a Value) -> Result<&'a Map<String, Value>, DataError> {
    value.as_object().ok_or_else(|| DataError::MalformedRecord {
        id: id.to_string(),
        reason: "expected a JSON object".into(),
    })
}

pub fn job_from_value(id: &str, value: &Value) -> Result<Job, DataError> {
    let record = as_object(id, value)?;
    let info = |key| lookup(record, &JOB_INFO, key);
    let profile = |key| lookup(record, &JOB_PROFILE, key);

    let sap_required = match info("vaga_sap") {
        Some(Value::String(s)) => s.trim() == "Sim",
        Some(Value::Bool(b)) => *b,
        _ => false,
    };

    Ok(Job {
        id: id.to_string(),
        title: text(info("titulo_vaga")),
        activities: text(profile("principais_atividades")),
        competencies: text(profile("competencia_tecnicas_e_comportamentais")),
        english_level: text(profile("nivel_ingles")),
        spanish_level: text(profile("nivel_espanhol")),
        sap_required,
        seniority: text(profile("nivel profissional").or_else(|| profile("nivel_profissional"))),
        client: text(info("cliente")),
        company_division: text(info("empresa_divisao")),
        area: text(profile("areas_atuacao")),
    })
}

pub fn candidate_from_value(id: &str, value: &Value) -> Result<Candidate, DataError> {
    let record = as_object(id, value)?;
    let basics = |key| lookup(record, &CANDIDATE_BASICS, key);
    let professional = |key| lookup(record, &CANDIDATE_PROFESSIONAL, key);
    let languages = |key| lookup(record, &CANDIDATE_LANGUAGES, key);

    let area_of_expertise = text(professional("area_atuacao")).map(|area| {
        area.trim_end_matches(|c: char| c == '-' || c.is_whitespace())
            .to_string()
    });

    Ok(Candidate {
        id: id.to_string(),
        name: text(basics("nome")),
        resume: text(record.get("cv_pt")),
        technical_knowledge: text(professional("conhecimentos_tecnicos")),
        area_of_expertise,
        qualifications: text(professional("qualificacoes")),
        english_level: text(languages("nivel_ingles")),
        spanish_level: text(languages("nivel_espanhol")),
        professional_level: text(professional("nivel_profissional")),
    })
}

/// Reads a collection of records: either `{id: record}` or an array of records carrying
/// their own `id_field`.
fn collect<T>(
    value: &Value,
    id_field: &str,
    convert: impl Fn(&str, &Value) -> Result<T, DataError>,
) -> Result<Vec<T>, DataError> {
    match value {
        Value::Object(keyed) => keyed.iter().map(|(id, record)| convert(id, record)).collect(),
        Value::Array(records) => records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let id = id_text(record.get(id_field)).ok_or_else(|| DataError::MalformedRecord {
                    id: format!("#{index}"),
                    reason: format!("missing `{id_field}`"),
                })?;
                convert(&id, record)
            })
            .collect(),
        _ => Err(DataError::MalformedRecord {
            id: "<root>".into(),
            reason: "expected an object keyed by id or an array of records".into(),
        }),
    }
}

pub fn jobs_from_value(value: &Value) -> Result<Vec<Job>, DataError> {
    collect(value, "id_vaga", job_from_value)
}

pub fn candidates_from_value(value: &Value) -> Result<Vec<Candidate>, DataError> {
    collect(value, "id_candidato", candidate_from_value)
}

pub fn load_jobs(path: impl AsRef<Path>) -> Result<Vec<Job>, ArtifactError> {
    let value: Value = read_json(path.as_ref())?;
    Ok(jobs_from_value(&value)?)
}

pub fn load_candidates(path: impl AsRef<Path>) -> Result<Vec<Candidate>, ArtifactError> {
    let value: Value = read_json(path.as_ref())?;
    Ok(candidates_from_value(&value)?)
}
