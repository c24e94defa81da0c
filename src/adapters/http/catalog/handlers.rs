//! HTTP handlers for catalog and recommendation endpoints.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::application::{RecommendPersonasQuery, RecommendSchoolsQuery};
use crate::domain::foundation::{CategoryId, PersonaId};
use crate::ports::CatalogReader;

use super::dto::{
    profile_from, recommended_limit, PersonaDetailResponse, PersonaItem, PersonaListParams,
    RankingResponse, SchoolDetailResponse, SchoolItem, SchoolListParams,
};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::state::AppState;

/// GET /api/schools - Schools ranked by aggregate relevance
pub async fn list_schools(
    State(state): State<AppState>,
    Query(params): Query<SchoolListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = RecommendSchoolsQuery {
        search: params.search,
        profile: profile_from(params.code, params.category)?,
        max_recommended: recommended_limit(params.max, state.max_recommended)?,
    };

    let ranking = state.recommend_schools_handler().handle(query);
    Ok(Json(RankingResponse::<SchoolItem>::from(ranking)))
}

/// GET /api/schools/:id - One school with its concepts and ranked personas
pub async fn get_school(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PersonaListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let id = CategoryId::new(id)?;
    let school = state.catalog.lookup_school(&id)?.clone();

    let personas = state.recommend_personas_handler().handle(RecommendPersonasQuery {
        school: Some(id),
        search: params.search,
        profile: profile_from(params.code, params.category)?,
        max_recommended: recommended_limit(params.max, state.max_recommended)?,
    })?;

    Ok(Json(SchoolDetailResponse::new(school, personas)))
}

/// GET /api/personas - Personas ranked by detail-view relevance
pub async fn list_personas(
    State(state): State<AppState>,
    Query(params): Query<PersonaListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = RecommendPersonasQuery {
        school: params.school.map(CategoryId::new).transpose()?,
        search: params.search,
        profile: profile_from(params.code, params.category)?,
        max_recommended: recommended_limit(params.max, state.max_recommended)?,
    };

    let ranking = state.recommend_personas_handler().handle(query)?;
    Ok(Json(RankingResponse::<PersonaItem>::from(ranking)))
}

/// GET /api/personas/:id - Full persona entry
pub async fn get_persona(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let persona = state.catalog.lookup_persona(&PersonaId::new(id)?)?.clone();
    let school_name = state.catalog.lookup_school(&persona.school)?.name.clone();

    Ok(Json(PersonaDetailResponse {
        persona,
        school_name,
    }))
}
