pub fn build_extraction_prompt(text: &str) -> String {
    format!(
        r#"Extract entities and relationships from the following text.

INSTRUCTIONS:
1. Identify key entities (people, organizations, concepts, technologies, locations, events)
2. Extract directed relationships between entities
3. Output ONLY valid JSON, nothing else
4. Use the exact schema below

SCHEMA:
{{
  "nodes": [
    {{"id": "EntityName", "type": "Person|Organization|Concept|Technology|Location|Event", "properties": {{}}}}
  ],
  "relationships": [
    {{"sourceId": "EntityName", "targetId": "OtherEntityName", "type": "RELATION_TYPE", "properties": {{}}}}
  ]
}}

RULES:
- Use the entity's name as its id, exactly as it appears in the text
- Every sourceId and targetId must match the id of a node in "nodes"
- Relationship types are UPPER_SNAKE_CASE verbs: "WORKS_AT", "LOCATED_IN", "CREATES", etc.
- Properties are optional scalar key/value pairs; omit what you don't know
- Output ONLY the JSON object, no markdown, no explanations

TEXT:
{text}

JSON OUTPUT:"#
    )
}
