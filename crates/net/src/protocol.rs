//! Wire protocol types
//!
//! JSON shapes exchanged with the portal's REST API and their conversion
//! into domain models. Field casing follows the server, which mixes
//! snake_case and camelCase between resources.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use aula_core::invariants::{
    assert_meeting_invariants, assert_proposal_invariants, assert_request_invariants,
    assert_topic_invariants,
};
use aula_core::models::{
    sort_trace, Meeting, MeetingApproval, MeetingId, MeetingOutcome, MeetingRequest,
    MeetingRequestId, MeetingRequestState, MeetingState, Modality, NewMeeting, NewMeetingRequest,
    NewProposal, NewTopic, Notification, NotificationId, PersonSummary, Proposal,
    ProposalDecision, ProposalId, ProposalState, Reservation, Role, Teacher, Topic, TopicCreator,
    TopicId, TraceEvent, TraceEventId, UserId, UserProfile, DEFAULT_NOTIFICATION_KIND,
};

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// Parse a wall-clock time sent as `HH:MM` or `HH:MM:SS`
pub fn parse_wire_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// Parse a server timestamp; naive values are taken as UTC
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Timestamp, or the current time when missing or unreadable
fn timestamp_or_now(raw: Option<&str>) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(Utc::now)
}

fn de_time<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_wire_time(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time '{raw}'")))
}

fn de_opt_time<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_wire_time))
}

fn ser_time<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format("%H:%M").to_string())
}

/// `null` and missing both read as the type's default
fn de_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

type JsonMap = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PersonWire {
    pub id: i64,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub correo: String,
    #[serde(default)]
    pub carrera: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub rol: String,
}

impl From<PersonWire> for PersonSummary {
    fn from(w: PersonWire) -> Self {
        Self {
            id: UserId(w.id),
            name: w.nombre,
            email: w.correo,
            career: w.carrera,
            phone: w.telefono,
            role: w.rol,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeacherWire {
    pub id: i64,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub correo: String,
    #[serde(default)]
    pub carrera: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub ramas: Option<Vec<String>>,
}

impl From<TeacherWire> for Teacher {
    fn from(w: TeacherWire) -> Self {
        Self {
            id: UserId(w.id),
            name: w.nombre,
            email: w.correo,
            career: w.carrera,
            phone: w.telefono,
            branches: w.ramas,
        }
    }
}

/// Body returned by `POST login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginWire {
    #[serde(alias = "role")]
    pub rol: Role,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub correo: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub rut: Option<String>,
    #[serde(default)]
    pub carrera: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
}

impl LoginWire {
    /// Profile for the signed-in account; the server may omit the echoed email
    pub fn into_profile(self, email: &str) -> UserProfile {
        UserProfile {
            id: self.id.map(UserId),
            role: self.rol,
            name: self.nombre,
            email: if self.correo.is_empty() {
                email.to_string()
            } else {
                self.correo
            },
            rut: self.rut,
            career: self.carrera,
            phone: self.telefono,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CreatorWire {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub rol: String,
    #[serde(default)]
    pub carrera: Option<String>,
}

impl From<CreatorWire> for TopicCreator {
    fn from(w: CreatorWire) -> Self {
        Self {
            name: w.nombre,
            role: w.rol,
            career: w.carrera,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationWire {
    pub id: i64,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub correo: String,
    #[serde(default)]
    pub carrera: Option<String>,
    #[serde(rename = "reservadoEn", default)]
    pub reservado_en: Option<String>,
}

impl From<ReservationWire> for Reservation {
    fn from(w: ReservationWire) -> Self {
        Self {
            student_id: UserId(w.id),
            name: w.nombre,
            email: w.correo,
            career: w.carrera,
            reserved_at: parse_timestamp(w.reservado_en.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicWire {
    pub id: i64,
    pub titulo: String,
    #[serde(default)]
    pub carrera: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub requisitos: Vec<String>,
    pub cupos: u32,
    #[serde(rename = "cuposDisponibles", default)]
    pub cupos_disponibles: Option<u32>,
    #[serde(rename = "tieneCupoPropio", default)]
    pub tiene_cupo_propio: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(rename = "creadoPor", default)]
    pub creado_por: Option<CreatorWire>,
    #[serde(rename = "docenteACargo", default)]
    pub docente_a_cargo: Option<CreatorWire>,
    #[serde(default)]
    pub docente_responsable: Option<i64>,
    #[serde(rename = "inscripcionesActivas", default)]
    pub inscripciones_activas: Option<Vec<ReservationWire>>,
}

impl From<TopicWire> for Topic {
    fn from(w: TopicWire) -> Self {
        let mut topic = Topic {
            id: TopicId(w.id),
            title: w.titulo,
            career: w.carrera,
            description: w.descripcion,
            requirements: w.requisitos,
            total_slots: w.cupos,
            available_slots: w.cupos_disponibles.unwrap_or(w.cupos).min(w.cupos),
            has_own_slot: w.tiene_cupo_propio,
            created_by: w.created_by.map(UserId),
            creator: w.creado_por.map(Into::into),
            teacher_in_charge: w.docente_a_cargo.map(Into::into),
            responsible_teacher: w.docente_responsable.map(UserId),
            created_at: parse_timestamp(w.created_at.as_deref()),
            reservations: w
                .inscripciones_activas
                .map(|list| list.into_iter().map(Into::into).collect()),
        };
        // The reservation list is authoritative for slot counts
        topic.recompute_slots();
        assert_topic_invariants(&topic);
        topic
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTopicBody<'a> {
    pub titulo: &'a str,
    pub carrera: &'a str,
    pub descripcion: &'a str,
    pub requisitos: &'a [String],
    pub cupos: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
}

impl<'a> From<&'a NewTopic> for NewTopicBody<'a> {
    fn from(t: &'a NewTopic) -> Self {
        Self {
            titulo: &t.title,
            carrera: &t.career,
            descripcion: &t.description,
            requisitos: &t.requirements,
            cupos: t.total_slots,
            created_by: t.created_by,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReserveBody {
    pub alumno: UserId,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanionsBody<'a> {
    pub alumno: UserId,
    pub correos: &'a [String],
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TopicQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alumno: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usuario: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrera: Option<String>,
}

impl TopicQuery {
    pub fn for_student(student: UserId) -> Self {
        Self {
            alumno: Some(student),
            ..Self::default()
        }
    }

    pub fn for_user(user: UserId) -> Self {
        Self {
            usuario: Some(user),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Proposals
// ---------------------------------------------------------------------------

fn default_requested_slots() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProposalWire {
    pub id: i64,
    pub titulo: String,
    #[serde(default)]
    pub objetivo: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub rama: String,
    pub estado: ProposalState,
    #[serde(default)]
    pub comentario_decision: Option<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub preferencias_docentes: Vec<i64>,
    #[serde(default = "default_requested_slots")]
    pub cupos_requeridos: u32,
    #[serde(default)]
    pub cupos_maximo_autorizado: Option<u32>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub correos_companeros: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub alumno: Option<PersonWire>,
    #[serde(default)]
    pub docente: Option<PersonWire>,
}

impl From<ProposalWire> for Proposal {
    fn from(w: ProposalWire) -> Self {
        let created_at = timestamp_or_now(w.created_at.as_deref());
        let updated_at = parse_timestamp(w.updated_at.as_deref())
            .unwrap_or(created_at)
            .max(created_at);
        let proposal = Proposal {
            id: ProposalId(w.id),
            title: w.titulo,
            objective: w.objetivo,
            description: w.descripcion,
            branch: w.rama,
            state: w.estado,
            decision_comment: w.comentario_decision,
            teacher_preferences: w.preferencias_docentes.into_iter().map(UserId).collect(),
            requested_slots: w.cupos_requeridos,
            authorized_slots: w.cupos_maximo_autorizado,
            peer_emails: w.correos_companeros,
            created_at,
            updated_at,
            student: w.alumno.map(Into::into),
            teacher: w.docente.map(Into::into),
        };
        assert_proposal_invariants(&proposal);
        proposal
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProposalBody<'a> {
    pub titulo: &'a str,
    pub objetivo: &'a str,
    pub descripcion: &'a str,
    pub rama: &'a str,
    pub preferencias_docentes: &'a [UserId],
    pub cupos_requeridos: u32,
    pub correos_companeros: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alumno_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docente_id: Option<UserId>,
}

impl<'a> From<&'a NewProposal> for NewProposalBody<'a> {
    fn from(p: &'a NewProposal) -> Self {
        Self {
            titulo: &p.title,
            objetivo: &p.objective,
            descripcion: &p.description,
            rama: &p.branch,
            preferencias_docentes: &p.teacher_preferences,
            cupos_requeridos: p.requested_slots,
            correos_companeros: &p.peer_emails,
            alumno_id: p.student_id,
            docente_id: p.teacher_id,
        }
    }
}

/// `PATCH propuestas/{id}/` body
#[derive(Debug, Clone, Serialize)]
pub struct ProposalDecisionBody<'a> {
    pub accion: &'static str,
    pub estado: ProposalState,
    pub comentario_decision: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cupos_autorizados: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docente_id: Option<UserId>,
}

impl<'a> ProposalDecisionBody<'a> {
    pub fn new(decision: &'a ProposalDecision, teacher: Option<UserId>) -> Self {
        Self {
            accion: decision.action_tag(),
            estado: decision.target_state(),
            comentario_decision: decision.comment().trim(),
            cupos_autorizados: decision.authorized_slots(),
            docente_id: teacher,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProposalQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alumno: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docente: Option<UserId>,
}

impl ProposalQuery {
    pub fn for_student(student: UserId) -> Self {
        Self {
            alumno: Some(student),
            docente: None,
        }
    }

    pub fn for_teacher(teacher: UserId) -> Self {
        Self {
            alumno: None,
            docente: Some(teacher),
        }
    }

    /// Every proposal; coordination only
    pub fn all() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Meetings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TraceEventWire {
    pub id: i64,
    #[serde(default)]
    pub tipo: String,
    #[serde(rename = "estadoAnterior", default)]
    pub estado_anterior: Option<String>,
    #[serde(rename = "estadoNuevo", default)]
    pub estado_nuevo: Option<String>,
    #[serde(default)]
    pub comentario: Option<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub datos: JsonMap,
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub usuario: Option<PersonWire>,
}

impl From<TraceEventWire> for TraceEvent {
    fn from(w: TraceEventWire) -> Self {
        Self {
            id: TraceEventId(w.id),
            kind: w.tipo,
            previous_state: w.estado_anterior,
            new_state: w.estado_nuevo,
            comment: w.comentario,
            data: w.datos,
            at: timestamp_or_now(w.fecha.as_deref()),
            user: w.usuario.map(Into::into),
        }
    }
}

fn trace_from_wire(events: Vec<TraceEventWire>) -> Vec<TraceEvent> {
    let mut trace: Vec<TraceEvent> = events.into_iter().map(Into::into).collect();
    sort_trace(&mut trace);
    trace
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeetingRequestWire {
    pub id: i64,
    pub estado: MeetingRequestState,
    #[serde(default)]
    pub motivo: String,
    #[serde(rename = "disponibilidadSugerida", default)]
    pub disponibilidad_sugerida: Option<String>,
    #[serde(rename = "fechaSugerida", default)]
    pub fecha_sugerida: Option<NaiveDate>,
    #[serde(rename = "horaSugerida", default, deserialize_with = "de_opt_time")]
    pub hora_sugerida: Option<NaiveTime>,
    #[serde(rename = "modalidadSugerida", default)]
    pub modalidad_sugerida: Option<String>,
    #[serde(rename = "creadoEn", default)]
    pub creado_en: Option<String>,
    #[serde(rename = "actualizadoEn", default)]
    pub actualizado_en: Option<String>,
    #[serde(default)]
    pub alumno: Option<PersonWire>,
    #[serde(default)]
    pub docente: Option<PersonWire>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub trazabilidad: Vec<TraceEventWire>,
}

impl From<MeetingRequestWire> for MeetingRequest {
    fn from(w: MeetingRequestWire) -> Self {
        let request = MeetingRequest {
            id: MeetingRequestId(w.id),
            state: w.estado,
            reason: w.motivo,
            suggested_availability: w.disponibilidad_sugerida,
            suggested_date: w.fecha_sugerida,
            suggested_time: w.hora_sugerida,
            suggested_modality: w.modalidad_sugerida.as_deref().map(Modality::from_tag),
            created_at: timestamp_or_now(w.creado_en.as_deref()),
            updated_at: timestamp_or_now(w.actualizado_en.as_deref()),
            student: w.alumno.map(Into::into),
            teacher: w.docente.map(Into::into),
            trace: trace_from_wire(w.trazabilidad),
        };
        assert_request_invariants(&request);
        request
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeetingWire {
    pub id: i64,
    pub estado: MeetingState,
    #[serde(default)]
    pub motivo: String,
    #[serde(default)]
    pub observaciones: Option<String>,
    pub fecha: NaiveDate,
    #[serde(rename = "horaInicio", deserialize_with = "de_time")]
    pub hora_inicio: NaiveTime,
    #[serde(rename = "horaTermino", deserialize_with = "de_time")]
    pub hora_termino: NaiveTime,
    #[serde(default)]
    pub modalidad: String,
    #[serde(rename = "creadoEn", default)]
    pub creado_en: Option<String>,
    #[serde(rename = "actualizadoEn", default)]
    pub actualizado_en: Option<String>,
    #[serde(default)]
    pub alumno: Option<PersonWire>,
    #[serde(default)]
    pub docente: Option<PersonWire>,
    #[serde(rename = "solicitudId", default)]
    pub solicitud_id: Option<i64>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub trazabilidad: Vec<TraceEventWire>,
}

impl From<MeetingWire> for Meeting {
    fn from(w: MeetingWire) -> Self {
        let meeting = Meeting {
            id: MeetingId(w.id),
            state: w.estado,
            reason: w.motivo,
            observations: w.observaciones,
            date: w.fecha,
            start: w.hora_inicio,
            end: w.hora_termino,
            modality: Modality::from_tag(&w.modalidad),
            created_at: timestamp_or_now(w.creado_en.as_deref()),
            updated_at: timestamp_or_now(w.actualizado_en.as_deref()),
            student: w.alumno.map(Into::into),
            teacher: w.docente.map(Into::into),
            request_id: w.solicitud_id.map(MeetingRequestId),
            trace: trace_from_wire(w.trazabilidad),
        };
        assert_meeting_invariants(&meeting);
        meeting
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMeetingRequestBody<'a> {
    pub alumno: UserId,
    pub motivo: &'a str,
    #[serde(rename = "disponibilidadSugerida", skip_serializing_if = "Option::is_none")]
    pub disponibilidad_sugerida: Option<&'a str>,
}

impl<'a> From<&'a NewMeetingRequest> for NewMeetingRequestBody<'a> {
    fn from(r: &'a NewMeetingRequest) -> Self {
        Self {
            alumno: r.student_id,
            motivo: &r.reason,
            disponibilidad_sugerida: r.suggested_availability.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApproveRequestBody<'a> {
    pub docente: UserId,
    pub fecha: NaiveDate,
    #[serde(rename = "horaInicio", serialize_with = "ser_time")]
    pub hora_inicio: NaiveTime,
    #[serde(rename = "horaTermino", serialize_with = "ser_time")]
    pub hora_termino: NaiveTime,
    pub modalidad: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comentario: Option<&'a str>,
}

impl<'a> From<&'a MeetingApproval> for ApproveRequestBody<'a> {
    fn from(a: &'a MeetingApproval) -> Self {
        Self {
            docente: a.teacher_id,
            fecha: a.date,
            hora_inicio: a.start,
            hora_termino: a.end,
            modalidad: a.modality.as_tag(),
            comentario: a.comment.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectRequestBody<'a> {
    pub docente: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comentario: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMeetingBody<'a> {
    pub alumno: UserId,
    pub docente: UserId,
    pub fecha: NaiveDate,
    #[serde(rename = "horaInicio", serialize_with = "ser_time")]
    pub hora_inicio: NaiveTime,
    #[serde(rename = "horaTermino", serialize_with = "ser_time")]
    pub hora_termino: NaiveTime,
    pub modalidad: &'a str,
    pub motivo: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<&'a str>,
}

impl<'a> From<&'a NewMeeting> for NewMeetingBody<'a> {
    fn from(m: &'a NewMeeting) -> Self {
        Self {
            alumno: m.student_id,
            docente: m.teacher_id,
            fecha: m.date,
            hora_inicio: m.start,
            hora_termino: m.end,
            modalidad: m.modality.as_tag(),
            motivo: &m.reason,
            observaciones: m.observations.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CloseMeetingBody<'a> {
    pub docente: UserId,
    pub estado: MeetingState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comentario: Option<&'a str>,
}

impl<'a> CloseMeetingBody<'a> {
    pub fn new(teacher: UserId, outcome: MeetingOutcome, comment: Option<&'a str>) -> Self {
        Self {
            docente: teacher,
            estado: outcome.state(),
            comentario: comment,
        }
    }
}

/// Filters shared by the meeting-request and meeting listings
#[derive(Debug, Clone, Default, Serialize)]
pub struct MeetingFilter<S> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alumno: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docente: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinador: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<S>,
}

pub type RequestQuery = MeetingFilter<MeetingRequestState>;
pub type MeetingQuery = MeetingFilter<MeetingState>;

impl<S> MeetingFilter<S> {
    /// Listing scoped to the signed-in user's role
    pub fn for_role(role: Role, user: UserId) -> Self {
        let mut filter = Self {
            alumno: None,
            docente: None,
            coordinador: None,
            estado: None,
        };
        match role {
            Role::Student => filter.alumno = Some(user),
            Role::Teacher => filter.docente = Some(user),
            Role::Coordination => filter.coordinador = Some(user),
        }
        filter
    }

    pub fn with_state(mut self, state: S) -> Self {
        self.estado = Some(state);
        self
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationWire {
    pub id: i64,
    #[serde(default)]
    pub titulo: String,
    #[serde(default)]
    pub mensaje: String,
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub leida: bool,
    #[serde(default, deserialize_with = "de_null_default")]
    pub meta: JsonMap,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<NotificationWire> for Notification {
    fn from(w: NotificationWire) -> Self {
        Self {
            id: NotificationId(w.id),
            title: w.titulo,
            message: w.mensaje,
            kind: w
                .tipo
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_NOTIFICATION_KIND.to_string()),
            read: w.leida,
            meta: w.meta,
            created_at: timestamp_or_now(w.created_at.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationQuery {
    pub usuario: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leida: Option<bool>,
}

impl NotificationQuery {
    pub fn new(user: UserId, unread_only: bool) -> Self {
        Self {
            usuario: user,
            leida: unread_only.then_some(false),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TeacherQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrera: Option<&'a str>,
}
