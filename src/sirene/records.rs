//! Wire types for the SIRENE /siret endpoint.

use serde::{Deserialize, Serialize};

/// One page of the /siret listing.
#[derive(Debug, Deserialize)]
pub struct SiretResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub etablissements: Vec<Etablissement>,
}

/// Pagination envelope. On the last page `curseurSuivant` repeats the
/// request cursor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHeader {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub nombre: u64,
    #[serde(default)]
    pub curseur: Option<String>,
    #[serde(default)]
    pub curseur_suivant: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Etablissement {
    /// Period list; the current period is first and usually the only entry.
    #[serde(default)]
    pub periodes_etablissement: Vec<PeriodeEtablissement>,
    #[serde(default)]
    pub adresse_etablissement: AdresseEtablissement,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodeEtablissement {
    #[serde(default)]
    pub activite_principale_etablissement: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdresseEtablissement {
    #[serde(default)]
    pub code_commune_etablissement: Option<String>,
    #[serde(default)]
    pub libelle_commune_etablissement: Option<String>,
}

/// Flat CSV row: the current activity code plus the commune attributes.
/// Header names match the API field names so downstream scripts keep working.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstablishmentRow {
    #[serde(rename = "activitePrincipaleEtablissement")]
    pub activite_principale: String,
    #[serde(rename = "codeCommuneEtablissement")]
    pub code_commune: String,
    #[serde(rename = "libelleCommuneEtablissement")]
    pub libelle_commune: String,
}

impl EstablishmentRow {
    pub fn from_wire(etablissement: &Etablissement) -> Self {
        let activite = etablissement
            .periodes_etablissement
            .first()
            .and_then(|p| p.activite_principale_etablissement.clone())
            .unwrap_or_default();
        let adresse = &etablissement.adresse_etablissement;
        Self {
            activite_principale: activite,
            code_commune: adresse.code_commune_etablissement.clone().unwrap_or_default(),
            libelle_commune: adresse
                .libelle_commune_etablissement
                .clone()
                .unwrap_or_default(),
        }
    }
}

impl SiretResponse {
    /// True when this page ends the listing: nothing returned, or the next
    /// cursor points back at the one just used.
    pub fn is_last_page(&self, requested_cursor: &str) -> bool {
        if self.header.nombre == 0 || self.etablissements.is_empty() {
            return true;
        }
        match self.header.curseur_suivant.as_deref() {
            Some(next) => next == requested_cursor,
            None => true,
        }
    }

    /// Cursor for the following request, if any.
    pub fn next_cursor(&self) -> Option<&str> {
        self.header.curseur_suivant.as_deref()
    }
}
