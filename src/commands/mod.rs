/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod analytics;
pub mod base;
pub mod company;
pub mod discover;
pub mod invitation;
pub mod project;
pub mod search;

use connector::dto::CompanyDto;

pub(crate) fn print_company_summary(company: &CompanyDto) {
    let verified = if company.verified { " [verified]" } else { "" };
    println!("{:>6}  {}{} ({})", company.id, company.name, verified, company.location);
}
