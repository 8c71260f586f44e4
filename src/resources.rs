use reqwest::Method;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::executor::{ApiRequest, Base, is_empty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Profiles,
    Identity,
    Portfolios,
    SponsoredProducts,
    SponsoredBrands,
    SponsoredDisplay,
    ProductEligibility,
    Reports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }
}

/// What an operation accepts besides its path ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Params {
    None,
    /// Filters on GET, an optional body otherwise.
    Optional,
    Required,
}

/// One Ads API call: a name, a verb and a path template with `{}` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub family: Family,
    pub verb: Verb,
    pub path: &'static str,
    pub params: Params,
}

impl Operation {
    pub fn arity(&self) -> usize {
        self.path.matches("{}").count()
    }

    pub fn base(&self) -> Base {
        match self.family {
            Family::Identity => Base::Identity,
            _ => Base::Api,
        }
    }

    pub fn render_path(&self, ids: &[&str]) -> Result<String> {
        if ids.len() != self.arity() {
            return Err(Error::InvalidParams(format!(
                "{} expects {} id(s), got {}",
                self.name,
                self.arity(),
                ids.len()
            )));
        }
        let mut out = String::with_capacity(self.path.len());
        let mut rest = self.path;
        for id in ids {
            if id.trim().is_empty() {
                return Err(Error::InvalidParams(format!("{} called with an empty id", self.name)));
            }
            if let Some((head, tail)) = rest.split_once("{}") {
                out.push_str(head);
                out.push_str(id);
                rest = tail;
            }
        }
        out.push_str(rest);
        Ok(out)
    }

    pub fn request(&self, ids: &[&str], params: Option<Value>) -> Result<ApiRequest> {
        let params = params.filter(|p| !is_empty(p));
        match (self.params, params.is_some()) {
            (Params::None, true) => {
                return Err(Error::InvalidParams(format!("{} takes no parameters", self.name)));
            }
            (Params::Required, false) => {
                return Err(Error::InvalidParams(format!("{} requires a request body", self.name)));
            }
            _ => {}
        }
        let mut request = ApiRequest::new(self.verb.method(), self.render_path(ids)?).with_base(self.base());
        request.params = params;
        Ok(request)
    }
}

/// Campaign type selector for report and snapshot requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CampaignType {
    #[default]
    SponsoredProducts,
    SponsoredBrands,
    SponsoredDisplay,
}

impl CampaignType {
    pub fn as_str(self) -> &'static str {
        match self {
            CampaignType::SponsoredProducts => "sponsoredProducts",
            CampaignType::SponsoredBrands => "sponsoredBrands",
            CampaignType::SponsoredDisplay => "sponsoredDisplay",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            CampaignType::SponsoredProducts => "sp",
            CampaignType::SponsoredBrands => "hsa",
            CampaignType::SponsoredDisplay => "sd",
        }
    }

    /// Reads `campaignType` from request params; anything unrecognised is
    /// Sponsored Products.
    pub fn from_params(params: Option<&Value>) -> Self {
        match params.and_then(|p| p.get("campaignType")).and_then(Value::as_str) {
            Some("sponsoredBrands") => CampaignType::SponsoredBrands,
            Some("sponsoredDisplay") => CampaignType::SponsoredDisplay,
            _ => CampaignType::SponsoredProducts,
        }
    }
}

const fn op(family: Family, name: &'static str, verb: Verb, path: &'static str, params: Params) -> Operation {
    Operation {
        name,
        family,
        verb,
        path,
        params,
    }
}

const fn list(family: Family, name: &'static str, path: &'static str) -> Operation {
    op(family, name, Verb::Get, path, Params::Optional)
}

const fn fetch(family: Family, name: &'static str, path: &'static str) -> Operation {
    op(family, name, Verb::Get, path, Params::None)
}

const fn create(family: Family, name: &'static str, path: &'static str) -> Operation {
    op(family, name, Verb::Post, path, Params::Required)
}

const fn update(family: Family, name: &'static str, path: &'static str) -> Operation {
    op(family, name, Verb::Put, path, Params::Required)
}

const fn patch(family: Family, name: &'static str, path: &'static str) -> Operation {
    op(family, name, Verb::Patch, path, Params::Required)
}

const fn remove(family: Family, name: &'static str, path: &'static str) -> Operation {
    op(family, name, Verb::Delete, path, Params::None)
}

use Family::{
    Identity, Portfolios, ProductEligibility, Profiles, Reports, SponsoredBrands as Sb, SponsoredDisplay as Sd,
    SponsoredProducts as Sp,
};

pub static OPERATIONS: &[Operation] = &[
    // profiles
    list(Profiles, "listProfiles", "profiles"),
    fetch(Profiles, "getProfile", "profiles/{}"),
    update(Profiles, "updateProfiles", "profiles"),
    update(Profiles, "registerProfile", "profiles/register"),
    fetch(Profiles, "registerProfileStatus", "profiles/register/{}/status"),
    update(Profiles, "registerBrand", "profiles/registerBrand"),
    fetch(Identity, "getUserProfile", "user/profile"),
    // portfolios
    list(Portfolios, "listPortfolios", "portfolios"),
    list(Portfolios, "listPortfoliosEx", "portfolios/extended"),
    fetch(Portfolios, "getPortfolio", "portfolios/{}"),
    fetch(Portfolios, "getPortfolioEx", "portfolios/extended/{}"),
    create(Portfolios, "createPortfolios", "portfolios"),
    update(Portfolios, "updatePortfolios", "portfolios"),
    // sponsored products
    list(Sp, "listCampaigns", "sp/campaigns"),
    list(Sp, "listCampaignsEx", "sp/campaigns/extended"),
    fetch(Sp, "getCampaign", "sp/campaigns/{}"),
    fetch(Sp, "getCampaignEx", "sp/campaigns/extended/{}"),
    create(Sp, "createCampaigns", "sp/campaigns"),
    update(Sp, "updateCampaigns", "sp/campaigns"),
    remove(Sp, "archiveCampaign", "sp/campaigns/{}"),
    list(Sp, "listAdGroups", "sp/adGroups"),
    list(Sp, "listAdGroupsEx", "sp/adGroups/extended"),
    fetch(Sp, "getAdGroup", "sp/adGroups/{}"),
    fetch(Sp, "getAdGroupEx", "sp/adGroups/extended/{}"),
    create(Sp, "createAdGroups", "sp/adGroups"),
    update(Sp, "updateAdGroups", "sp/adGroups"),
    remove(Sp, "archiveAdGroup", "sp/adGroups/{}"),
    list(Sp, "listBiddableKeywords", "sp/keywords"),
    list(Sp, "listBiddableKeywordsEx", "sp/keywords/extended"),
    fetch(Sp, "getBiddableKeyword", "sp/keywords/{}"),
    fetch(Sp, "getBiddableKeywordEx", "sp/keywords/extended/{}"),
    create(Sp, "createBiddableKeywords", "sp/keywords"),
    update(Sp, "updateBiddableKeywords", "sp/keywords"),
    remove(Sp, "archiveBiddableKeyword", "sp/keywords/{}"),
    list(Sp, "listNegativeKeywords", "sp/negativeKeywords"),
    list(Sp, "listNegativeKeywordsEx", "sp/negativeKeywords/extended"),
    fetch(Sp, "getNegativeKeyword", "sp/negativeKeywords/{}"),
    fetch(Sp, "getNegativeKeywordEx", "sp/negativeKeywords/extended/{}"),
    create(Sp, "createNegativeKeywords", "sp/negativeKeywords"),
    update(Sp, "updateNegativeKeywords", "sp/negativeKeywords"),
    remove(Sp, "archiveNegativeKeyword", "sp/negativeKeywords/{}"),
    list(Sp, "listCampaignNegativeKeywords", "sp/campaignNegativeKeywords"),
    list(Sp, "listCampaignNegativeKeywordsEx", "sp/campaignNegativeKeywords/extended"),
    fetch(Sp, "getCampaignNegativeKeyword", "sp/campaignNegativeKeywords/{}"),
    fetch(Sp, "getCampaignNegativeKeywordEx", "sp/campaignNegativeKeywords/extended/{}"),
    create(Sp, "createCampaignNegativeKeywords", "sp/campaignNegativeKeywords"),
    update(Sp, "updateCampaignNegativeKeywords", "sp/campaignNegativeKeywords"),
    remove(Sp, "removeCampaignNegativeKeyword", "sp/campaignNegativeKeywords/{}"),
    list(Sp, "listProductAds", "sp/productAds"),
    list(Sp, "listProductAdsEx", "sp/productAds/extended"),
    fetch(Sp, "getProductAd", "sp/productAds/{}"),
    fetch(Sp, "getProductAdEx", "sp/productAds/extended/{}"),
    create(Sp, "createProductAds", "sp/productAds"),
    update(Sp, "updateProductAds", "sp/productAds"),
    remove(Sp, "archiveProductAd", "sp/productAds/{}"),
    list(Sp, "listTargetingClauses", "sp/targets"),
    list(Sp, "listTargetingClausesEx", "sp/targets/extended"),
    fetch(Sp, "getTargetingClause", "sp/targets/{}"),
    fetch(Sp, "getTargetingClauseEx", "sp/targets/extended/{}"),
    create(Sp, "createTargetingClauses", "sp/targets"),
    update(Sp, "updateTargetingClauses", "sp/targets"),
    remove(Sp, "archiveTargetingClause", "sp/targets/{}"),
    list(Sp, "listNegativeTargetingClauses", "sp/negativeTargets"),
    list(Sp, "listNegativeTargetingClausesEx", "sp/negativeTargets/extended"),
    fetch(Sp, "getNegativeTargetingClause", "sp/negativeTargets/{}"),
    fetch(Sp, "getNegativeTargetingClauseEx", "sp/negativeTargets/extended/{}"),
    create(Sp, "createNegativeTargetingClauses", "sp/negativeTargets"),
    update(Sp, "updateNegativeTargetingClauses", "sp/negativeTargets"),
    remove(Sp, "archiveNegativeTargetingClause", "sp/negativeTargets/{}"),
    fetch(Sp, "getAdGroupBidRecommendations", "sp/adGroups/{}/bidRecommendations"),
    fetch(Sp, "getKeywordBidRecommendations", "sp/keywords/{}/bidRecommendations"),
    create(Sp, "bulkGetKeywordBidRecommendations", "sp/keywords/bidRecommendations"),
    create(Sp, "getTargetBidRecommendations", "sp/targets/bidRecommendations"),
    list(Sp, "getAdGroupKeywordSuggestions", "sp/adGroups/{}/suggested/keywords"),
    list(Sp, "getAdGroupKeywordSuggestionsEx", "sp/adGroups/{}/suggested/keywords/extended"),
    list(Sp, "getAsinKeywordSuggestions", "sp/asins/{}/suggested/keywords"),
    create(Sp, "bulkGetAsinKeywordSuggestions", "sp/asins/suggested/keywords"),
    create(Sp, "createTargetRecommendations", "sp/targets/productRecommendations"),
    list(Sp, "getTargetingCategories", "sp/targets/categories"),
    list(Sp, "getBrandRecommendations", "sp/targets/brands"),
    // sponsored brands
    list(Sb, "listSponsoredBrandCampaigns", "sb/campaigns"),
    fetch(Sb, "getSponsoredBrandCampaign", "sb/campaigns/{}"),
    create(Sb, "createSponsoredBrandCampaigns", "sb/campaigns"),
    update(Sb, "updateSponsoredBrandCampaigns", "sb/campaigns"),
    remove(Sb, "archiveSponsoredBrandCampaign", "sb/campaigns/{}"),
    list(Sb, "listSponsoredBrandAdGroups", "sb/adGroups"),
    fetch(Sb, "getSponsoredBrandAdGroup", "sb/adGroups/{}"),
    list(Sb, "listSponsoredBrandKeywords", "sb/keywords"),
    fetch(Sb, "getSponsoredBrandKeyword", "sb/keywords/{}"),
    create(Sb, "createSponsoredBrandKeywords", "sb/keywords"),
    update(Sb, "updateSponsoredBrandKeywords", "sb/keywords"),
    remove(Sb, "archiveSponsoredBrandKeyword", "sb/keywords/{}"),
    list(Sb, "listSponsoredBrandNegativeKeywords", "sb/negativeKeywords"),
    fetch(Sb, "getSponsoredBrandNegativeKeyword", "sb/negativeKeywords/{}"),
    create(Sb, "createSponsoredBrandNegativeKeywords", "sb/negativeKeywords"),
    update(Sb, "updateSponsoredBrandNegativeKeywords", "sb/negativeKeywords"),
    remove(Sb, "archiveSponsoredBrandNegativeKeyword", "sb/negativeKeywords/{}"),
    op(Sb, "listSponsoredBrandTargets", Verb::Post, "sb/targets/list", Params::Optional),
    fetch(Sb, "getSponsoredBrandTarget", "sb/targets/{}"),
    create(Sb, "createSponsoredBrandTargets", "sb/targets"),
    update(Sb, "updateSponsoredBrandTargets", "sb/targets"),
    remove(Sb, "archiveSponsoredBrandTarget", "sb/targets/{}"),
    op(Sb, "listSponsoredBrandNegativeTargets", Verb::Post, "sb/negativeTargets/list", Params::Optional),
    fetch(Sb, "getSponsoredBrandNegativeTarget", "sb/negativeTargets/{}"),
    create(Sb, "createSponsoredBrandNegativeTargets", "sb/negativeTargets"),
    update(Sb, "updateSponsoredBrandNegativeTargets", "sb/negativeTargets"),
    remove(Sb, "archiveSponsoredBrandNegativeTarget", "sb/negativeTargets/{}"),
    // sponsored display
    list(Sd, "listSponsoredDisplayCampaigns", "sd/campaigns"),
    list(Sd, "listSponsoredDisplayCampaignsExtended", "sd/campaigns/extended"),
    fetch(Sd, "getSponsoredDisplayCampaign", "sd/campaigns/{}"),
    fetch(Sd, "getSponsoredDisplayCampaignExtended", "sd/campaigns/extended/{}"),
    create(Sd, "createSponsoredDisplayCampaigns", "sd/campaigns"),
    update(Sd, "updateSponsoredDisplayCampaigns", "sd/campaigns"),
    patch(Sd, "updatePartialSponsoredDisplayCampaigns", "sd/campaigns"),
    remove(Sd, "archiveSponsoredDisplayCampaign", "sd/campaigns/{}"),
    list(Sd, "listSponsoredDisplayAdGroups", "sd/adGroups"),
    list(Sd, "listSponsoredDisplayAdGroupsExtended", "sd/adGroups/extended"),
    fetch(Sd, "getSponsoredDisplayAdGroup", "sd/adGroups/{}"),
    fetch(Sd, "getSponsoredDisplayAdGroupExtended", "sd/adGroups/extended/{}"),
    create(Sd, "createSponsoredDisplayAdGroups", "sd/adGroups"),
    update(Sd, "updateSponsoredDisplayAdGroups", "sd/adGroups"),
    patch(Sd, "updatePartialSponsoredDisplayAdGroups", "sd/adGroups"),
    remove(Sd, "archiveSponsoredDisplayAdGroup", "sd/adGroups/{}"),
    list(Sd, "listSponsoredDisplayProductAds", "sd/productAds"),
    list(Sd, "listSponsoredDisplayProductAdsExtended", "sd/productAds/extended"),
    fetch(Sd, "getSponsoredDisplayProductAd", "sd/productAds/{}"),
    fetch(Sd, "getSponsoredDisplayProductAdExtended", "sd/productAds/extended/{}"),
    create(Sd, "createSponsoredDisplayProductAds", "sd/productAds"),
    update(Sd, "updateSponsoredDisplayProductAds", "sd/productAds"),
    patch(Sd, "updatePartialSponsoredDisplayProductAds", "sd/productAds"),
    remove(Sd, "archiveSponsoredDisplayProductAd", "sd/productAds/{}"),
    list(Sd, "listSponsoredDisplayTargetingClauses", "sd/targets"),
    list(Sd, "listSponsoredDisplayTargetingClausesExtended", "sd/targets/extended"),
    fetch(Sd, "getSponsoredDisplayTargetingClause", "sd/targets/{}"),
    fetch(Sd, "getSponsoredDisplayTargetingClauseExtended", "sd/targets/extended/{}"),
    create(Sd, "createSponsoredDisplayTargetingClauses", "sd/targets"),
    update(Sd, "updateSponsoredDisplayTargetingClauses", "sd/targets"),
    patch(Sd, "updatePartialSponsoredDisplayTargetingClauses", "sd/targets"),
    remove(Sd, "archiveSponsoredDisplayTargetingClause", "sd/targets/{}"),
    list(Sd, "listSponsoredDisplayNegativeTargetingClauses", "sd/negativeTargets"),
    list(Sd, "listSponsoredDisplayNegativeTargetingClausesExtended", "sd/negativeTargets/extended"),
    fetch(Sd, "getSponsoredDisplayNegativeTargetingClause", "sd/negativeTargets/{}"),
    fetch(Sd, "getSponsoredDisplayNegativeTargetingClauseExtended", "sd/negativeTargets/extended/{}"),
    create(Sd, "createSponsoredDisplayNegativeTargetingClauses", "sd/negativeTargets"),
    update(Sd, "updateSponsoredDisplayNegativeTargetingClauses", "sd/negativeTargets"),
    patch(Sd, "updatePartialSponsoredDisplayNegativeTargetingClauses", "sd/negativeTargets"),
    remove(Sd, "archiveSponsoredDisplayNegativeTargetingClause", "sd/negativeTargets/{}"),
    // product eligibility
    create(ProductEligibility, "getProductEligibility", "eligibility/product/list"),
    // reports and snapshots
    create(Reports, "requestReport", "{}/{}/report"),
    fetch(Reports, "getReport", "reports/{}"),
    fetch(Reports, "downloadReport", "reports/{}/download"),
    op(Reports, "requestSnapshot", Verb::Post, "{}/{}/snapshot", Params::Optional),
    fetch(Reports, "getSnapshot", "snapshots/{}"),
    fetch(Reports, "downloadSnapshot", "snapshots/{}/download"),
];

pub fn operations() -> &'static [Operation] {
    OPERATIONS
}

pub fn operations_for(family: Family) -> impl Iterator<Item = &'static Operation> {
    OPERATIONS.iter().filter(move |op| op.family == family)
}

/// Finds an operation by name, ignoring case and separators, so
/// `listProfiles`, `list-profiles` and `LIST_PROFILES` are the same.
pub fn find_operation(name: &str) -> Result<&'static Operation> {
    OPERATIONS
        .iter()
        .find(|op| names_match(op.name, name))
        .ok_or_else(|| Error::UnknownOperation(name.to_string()))
}

fn names_match(candidate: &str, input: &str) -> bool {
    normalize(candidate) == normalize(input)
}

fn normalize(value: &str) -> String {
    let mut out = String::new();
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        }
    }
    out
}
