/* This file is part of the Murphy Video Proxy project
*
*  Copyright (C) 2025 Murphy Video Proxy contributors
*
*  This program is free software: you can redistribute it and/or modify
*  it under the terms of the GNU Affero General Public License as published by
*  the Free Software Foundation, either version 3 of the License, or
*  (at your option) any later version.
*
*  This program is distributed in the hope that it will be useful,
*  but WITHOUT ANY WARRANTY; without even the implied warranty of
*  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
*  GNU Affero General Public License for more details.
*
*  You should have received a copy of the GNU Affero General Public License
*  along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::http::header::{HeaderMap, TryIntoHeaderPair};

pub trait HeaderMapExt {
    fn append_header<H: TryIntoHeaderPair>(&mut self, header: H) -> Result<(), H::Error>;
    fn replace_header<H: TryIntoHeaderPair>(&mut self, header: H) -> Result<(), H::Error>;
}

impl HeaderMapExt for HeaderMap {
    fn append_header<H: TryIntoHeaderPair>(&mut self, header: H) -> Result<(), H::Error> {
        let (name, value) = header.try_into_pair()?;
        self.append(name, value);
        Ok(())
    }

    fn replace_header<H: TryIntoHeaderPair>(&mut self, header: H) -> Result<(), H::Error> {
        let (name, value) = header.try_into_pair()?;
        self.insert(name, value);
        Ok(())
    }
}
