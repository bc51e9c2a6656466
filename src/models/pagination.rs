use crate::errors::ServiceError;
use serde::Deserialize;
use utoipa::IntoParams;

/// Raw `page` / `page_size` query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// 1-based page number
    pub page: Option<u64>,
    /// Items per page
    pub page_size: Option<u64>,
}

impl PaginationParams {
    /// Applies defaults and bounds, producing a page the services can use.
    pub fn resolve(&self, default_page_size: u64, max_page_size: u64) -> Result<PageRequest, ServiceError> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(default_page_size);

        if page < 1 {
            return Err(ServiceError::ValidationError(
                "page debe ser mayor o igual a 1".to_string(),
            ));
        }
        if page_size < 1 || page_size > max_page_size {
            return Err(ServiceError::ValidationError(format!(
                "page_size debe estar entre 1 y {}",
                max_page_size
            )));
        }

        let offset = (page - 1)
            .checked_mul(page_size)
            .filter(|offset| i64::try_from(*offset).is_ok());
        if offset.is_none() {
            return Err(ServiceError::ValidationError(format!(
                "page {} está fuera de rango",
                page
            )));
        }

        Ok(PageRequest { page, page_size })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// `LIMIT` and `OFFSET` as bound SQL integers
    pub fn limit_offset(&self) -> Result<(i64, i64), ServiceError> {
        let fuera_de_rango =
            || ServiceError::ValidationError(format!("page {} está fuera de rango", self.page));
        let limit = i64::try_from(self.page_size).map_err(|_| fuera_de_rango())?;
        let offset = i64::try_from(self.offset()).map_err(|_| fuera_de_rango())?;
        Ok((limit, offset))
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_apply() {
        let page = PaginationParams::default().resolve(10, 100).unwrap();
        assert_eq!(page, PageRequest { page: 1, page_size: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[rstest]
    #[case(Some(0), None)]
    #[case(None, Some(0))]
    #[case(None, Some(101))]
    fn out_of_range_is_rejected(#[case] page: Option<u64>, #[case] page_size: Option<u64>) {
        let params = PaginationParams { page, page_size };
        assert!(params.resolve(10, 100).is_err());
    }

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    #[case(25, 3, 9)]
    fn total_pages_rounds_up(#[case] total: u64, #[case] size: u64, #[case] expected: u64) {
        let page = PageRequest { page: 1, page_size: size };
        assert_eq!(page.total_pages(total), expected);
    }

    #[test]
    fn huge_page_numbers_are_rejected_instead_of_overflowing() {
        let params = PaginationParams {
            page: Some(u64::MAX),
            page_size: Some(100),
        };
        assert!(matches!(
            params.resolve(10, 100),
            Err(ServiceError::ValidationError(_))
        ));

        // Offset past i64::MAX cannot be bound as SQL.
        let params = PaginationParams {
            page: Some(u64::MAX / 100),
            page_size: Some(100),
        };
        assert!(params.resolve(10, 100).is_err());
    }

    #[test]
    fn limit_offset_never_panics() {
        let page = PageRequest { page: u64::MAX, page_size: 100 };
        assert!(page.limit_offset().is_err());

        let page = PageRequest { page: 3, page_size: 20 };
        assert_eq!(page.limit_offset().unwrap(), (20, 40));
    }

    #[test]
    fn offset_skips_previous_pages() {
        let page = PageRequest { page: 3, page_size: 20 };
        assert_eq!(page.offset(), 40);
    }
}
